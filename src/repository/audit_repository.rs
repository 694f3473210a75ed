use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{AuditAction, AuditEntry, AuditLog, AuditLogFilter, PageParams},
    error::{AppError, Result},
    repository::AuditRepository,
};

#[derive(FromRow)]
struct AuditRow {
    id: String,
    user_id: Option<String>,
    entity_type: String,
    entity_id: Option<String>,
    action: String,
    data_before: Option<String>,
    data_after: Option<String>,
    metadata: Option<String>,
    created_at: NaiveDateTime,
}

const AUDIT_COLUMNS: &str = "id, user_id, entity_type, entity_id, action, \
                             data_before, data_after, metadata, created_at";

const LIST_FILTER: &str = r#"
    WHERE (? IS NULL OR entity_type = ?)
      AND (? IS NULL OR entity_id = ?)
      AND (? IS NULL OR user_id = ?)
      AND (? IS NULL OR action = ?)
      AND (? IS NULL OR created_at >= ?)
      AND (? IS NULL OR created_at <= ?)
"#;

pub struct SqliteAuditRepository {
    pool: SqlitePool,
}

fn parse_uuid(value: Option<String>) -> Result<Option<Uuid>> {
    value
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|e| AppError::Database(e.to_string()))
}

fn parse_json(value: Option<String>) -> Result<Option<Value>> {
    value
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| AppError::Database(format!("Invalid audit payload: {}", e)))
}

fn to_json(value: &Option<Value>) -> Option<String> {
    value.as_ref().map(Value::to_string)
}

impl SqliteAuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_log(row: AuditRow) -> Result<AuditLog> {
        Ok(AuditLog {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: parse_uuid(row.user_id)?,
            entity_type: row.entity_type,
            entity_id: parse_uuid(row.entity_id)?,
            action: AuditAction::from_str(&row.action)
                .ok_or_else(|| AppError::Database(format!("Invalid audit action: {}", row.action)))?,
            data_before: parse_json(row.data_before)?,
            data_after: parse_json(row.data_after)?,
            metadata: parse_json(row.metadata)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl AuditRepository for SqliteAuditRepository {
    async fn create(&self, entry: &AuditEntry) -> Result<AuditLog> {
        let log = AuditLog {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            entity_type: entry.entity_type.to_string(),
            entity_id: entry.entity_id,
            action: entry.action,
            data_before: entry.data_before.clone(),
            data_after: entry.data_after.clone(),
            metadata: entry.metadata.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, user_id, entity_type, entity_id, action,
                data_before, data_after, metadata, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.id.to_string())
        .bind(log.user_id.map(|id| id.to_string()))
        .bind(&log.entity_type)
        .bind(log.entity_id.map(|id| id.to_string()))
        .bind(log.action.as_str())
        .bind(to_json(&log.data_before))
        .bind(to_json(&log.data_after))
        .bind(to_json(&log.metadata))
        .bind(log.created_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(log)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditLog>> {
        let row = sqlx::query_as::<_, AuditRow>(&format!(
            "SELECT {} FROM audit_logs WHERE id = ?",
            AUDIT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_log).transpose()
    }

    async fn list(&self, filter: &AuditLogFilter, page: PageParams) -> Result<(Vec<AuditLog>, i64)> {
        let entity_type = filter.entity_type.as_deref().filter(|s| !s.is_empty());
        let entity_id = filter.entity_id.map(|id| id.to_string());
        let user_id = filter.user_id.map(|id| id.to_string());
        let action = filter.action.map(|a| a.as_str());
        let from = filter.from.map(|t| t.naive_utc());
        let to = filter.to.map(|t| t.naive_utc());

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM audit_logs {}", LIST_FILTER))
            .bind(entity_type)
            .bind(entity_type)
            .bind(&entity_id)
            .bind(&entity_id)
            .bind(&user_id)
            .bind(&user_id)
            .bind(action)
            .bind(action)
            .bind(from)
            .bind(from)
            .bind(to)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, AuditRow>(&format!(
            "SELECT {} FROM audit_logs {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            AUDIT_COLUMNS, LIST_FILTER
        ))
        .bind(entity_type)
        .bind(entity_type)
        .bind(&entity_id)
        .bind(&entity_id)
        .bind(&user_id)
        .bind(&user_id)
        .bind(action)
        .bind(action)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let logs = rows
            .into_iter()
            .map(Self::row_to_log)
            .collect::<Result<Vec<_>>>()?;
        Ok((logs, total))
    }
}
