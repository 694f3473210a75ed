use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Login,
    RoleChange,
    Verify,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::StatusChange => "status_change",
            AuditAction::Login => "login",
            AuditAction::RoleChange => "role_change",
            AuditAction::Verify => "verify",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditAction::Create),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            "status_change" => Some(AuditAction::StatusChange),
            "login" => Some(AuditAction::Login),
            "role_change" => Some(AuditAction::RoleChange),
            "verify" => Some(AuditAction::Verify),
            _ => None,
        }
    }
}

/// One recorded admin action, with JSON snapshots of the entity around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub action: AuditAction,
    pub data_before: Option<Value>,
    pub data_after: Option<Value>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// What to record; the id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: Option<Uuid>,
    pub entity_type: &'static str,
    pub entity_id: Option<Uuid>,
    pub action: AuditAction,
    pub data_before: Option<Value>,
    pub data_after: Option<Value>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}
