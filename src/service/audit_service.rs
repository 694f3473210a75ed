use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    domain::{AuditAction, AuditEntry, AuditLog, AuditLogFilter, Page, PageParams},
    error::{AppError, Result},
    repository::AuditRepository,
};

/// Serializes an entity for the before/after columns.
pub fn snapshot<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// Writes an audit entry. A failed write is logged and never fails the caller,
    /// whose change has already been committed.
    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        entity_type: &'static str,
        entity_id: Option<Uuid>,
        action: AuditAction,
        data_before: Option<serde_json::Value>,
        data_after: Option<serde_json::Value>,
    ) -> Option<AuditLog> {
        let entry = AuditEntry {
            user_id: actor_id,
            entity_type,
            entity_id,
            action,
            data_before,
            data_after,
            metadata: None,
        };

        match self.repo.create(&entry).await {
            Ok(log) => Some(log),
            Err(e) => {
                warn!(
                    entity_type,
                    action = action.as_str(),
                    "Failed to write audit log: {}",
                    e
                );
                None
            }
        }
    }

    pub async fn list(&self, filter: &AuditLogFilter, page: PageParams) -> Result<Page<AuditLog>> {
        let (logs, total) = self.repo.list(filter, page).await?;
        Ok(Page::new(logs, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<AuditLog> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Audit log not found".to_string()))
    }
}
