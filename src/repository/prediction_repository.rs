use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Prediction,
    error::{AppError, Result},
    repository::PredictionRepository,
};

#[derive(FromRow)]
struct PredictionRow {
    id: String,
    image_url: String,
    is_plant: i32,
    plant_type: Option<String>,
    confidence: f64,
    uploaded_by: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn create(&self, prediction: &Prediction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO predictions (id, image_url, is_plant, plant_type, confidence, uploaded_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(prediction.id.to_string())
        .bind(&prediction.image_url)
        .bind(prediction.is_plant as i32)
        .bind(&prediction.plant_type)
        .bind(prediction.confidence)
        .bind(prediction.uploaded_by.map(|id| id.to_string()))
        .bind(prediction.created_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Prediction>> {
        let rows = sqlx::query_as::<_, PredictionRow>(
            r#"
            SELECT id, image_url, is_plant, plant_type, confidence, uploaded_by, created_at
            FROM predictions
            WHERE uploaded_by = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Prediction {
                    id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
                    image_url: row.image_url,
                    is_plant: row.is_plant != 0,
                    plant_type: row.plant_type,
                    confidence: row.confidence,
                    uploaded_by: row
                        .uploaded_by
                        .as_deref()
                        .map(Uuid::parse_str)
                        .transpose()
                        .map_err(|e| AppError::Database(e.to_string()))?,
                    created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
                })
            })
            .collect()
    }
}
