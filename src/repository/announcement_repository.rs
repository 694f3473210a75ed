use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Announcement, CreateAnnouncementRequest},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    message: String,
    audience: Option<String>,
    is_active: i32,
    created_by: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            message: row.message,
            audience: row.audience,
            is_active: row.is_active != 0,
            created_by: row
                .created_by
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(
        &self,
        request: &CreateAnnouncementRequest,
        created_by: Option<Uuid>,
    ) -> Result<Announcement> {
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: request.title.clone(),
            message: request.message.clone(),
            audience: request.audience.clone(),
            is_active: true,
            created_by,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO announcements (id, title, message, audience, is_active, created_by, created_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(announcement.id.to_string())
        .bind(&announcement.title)
        .bind(&announcement.message)
        .bind(&announcement.audience)
        .bind(created_by.map(|id| id.to_string()))
        .bind(announcement.created_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(announcement)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, title, message, audience, is_active, created_by, created_at
            FROM announcements
            WHERE (? = 0 OR is_active = 1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(active_only as i32)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_announcement).collect()
    }

    async fn deactivate(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE announcements SET is_active = 0 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }
        Ok(())
    }
}
