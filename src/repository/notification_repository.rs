use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        DeviceToken, NotificationPreferences, RegisterDeviceTokenRequest,
        UpdateNotificationPreferences,
    },
    error::{AppError, Result},
    repository::NotificationRepository,
};

#[derive(FromRow)]
struct DeviceTokenRow {
    id: String,
    user_id: String,
    token: String,
    platform: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct PreferencesRow {
    push_enabled: i32,
    email_enabled: i32,
    sms_enabled: i32,
}

impl From<PreferencesRow> for NotificationPreferences {
    fn from(row: PreferencesRow) -> Self {
        Self {
            push_enabled: row.push_enabled != 0,
            email_enabled: row.email_enabled != 0,
            sms_enabled: row.sms_enabled != 0,
        }
    }
}

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: DeviceTokenRow) -> Result<DeviceToken> {
        Ok(DeviceToken {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            token: row.token,
            platform: row.platform,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn upsert_device_token(
        &self,
        user_id: Uuid,
        request: &RegisterDeviceTokenRequest,
    ) -> Result<DeviceToken> {
        let now = Utc::now().naive_utc();

        // A token belongs to one device, so re-registration reassigns it.
        let row = sqlx::query_as::<_, DeviceTokenRow>(
            r#"
            INSERT INTO device_tokens (id, user_id, token, platform, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(token) DO UPDATE SET
                user_id = excluded.user_id,
                platform = excluded.platform,
                updated_at = excluded.updated_at
            RETURNING id, user_id, token, platform, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(&request.token)
        .bind(&request.platform)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_token(row)
    }

    async fn device_tokens(&self, user_id: Uuid) -> Result<Vec<DeviceToken>> {
        let rows = sqlx::query_as::<_, DeviceTokenRow>(
            r#"
            SELECT id, user_id, token, platform, created_at, updated_at
            FROM device_tokens
            WHERE user_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_token).collect()
    }

    async fn preferences(&self, user_id: Uuid) -> Result<NotificationPreferences> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            "SELECT push_enabled, email_enabled, sms_enabled FROM notification_preferences WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into).unwrap_or_default())
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        update: &UpdateNotificationPreferences,
    ) -> Result<NotificationPreferences> {
        let defaults = NotificationPreferences::default();

        let row = sqlx::query_as::<_, PreferencesRow>(
            r#"
            INSERT INTO notification_preferences (user_id, push_enabled, email_enabled, sms_enabled, updated_at)
            VALUES (?, COALESCE(?, ?), COALESCE(?, ?), COALESCE(?, ?), ?)
            ON CONFLICT(user_id) DO UPDATE SET
                push_enabled = COALESCE(?, push_enabled),
                email_enabled = COALESCE(?, email_enabled),
                sms_enabled = COALESCE(?, sms_enabled),
                updated_at = excluded.updated_at
            RETURNING push_enabled, email_enabled, sms_enabled
            "#,
        )
        .bind(user_id.to_string())
        .bind(update.push_enabled.map(|b| b as i32))
        .bind(defaults.push_enabled as i32)
        .bind(update.email_enabled.map(|b| b as i32))
        .bind(defaults.email_enabled as i32)
        .bind(update.sms_enabled.map(|b| b as i32))
        .bind(defaults.sms_enabled as i32)
        .bind(Utc::now().naive_utc())
        .bind(update.push_enabled.map(|b| b as i32))
        .bind(update.email_enabled.map(|b| b as i32))
        .bind(update.sms_enabled.map(|b| b as i32))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
