use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateReviewRequest, Review},
    error::{AppError, Result},
    repository::ReviewRepository,
};

#[derive(FromRow)]
struct ReviewRow {
    id: String,
    user_id: String,
    plant_id: String,
    rating: i64,
    comment: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_review(row: ReviewRow) -> Result<Review> {
        Ok(Review {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            plant_id: Uuid::parse_str(&row.plant_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            rating: row.rating,
            comment: row.comment,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn create(&self, user_id: Uuid, request: &CreateReviewRequest) -> Result<Review> {
        let review = Review {
            id: Uuid::new_v4(),
            user_id,
            plant_id: request.plant_id,
            rating: request.rating,
            comment: request.comment.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO reviews (id, user_id, plant_id, rating, comment, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(review.id.to_string())
        .bind(user_id.to_string())
        .bind(review.plant_id.to_string())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(review)
    }

    async fn list_by_plant(&self, plant_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, user_id, plant_id, rating, comment, created_at
            FROM reviews
            WHERE plant_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(plant_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_review).collect()
    }
}
