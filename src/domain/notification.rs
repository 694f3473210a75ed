use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Re-registering a known token moves it to the calling user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterDeviceTokenRequest {
    #[validate(length(min = 1, max = 512, message = "must be 1-512 characters"))]
    pub token: String,
    /// `ios`, `android` or `web`.
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub push_enabled: bool,
    pub email_enabled: bool,
    pub sms_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            email_enabled: false,
            sms_enabled: false,
        }
    }
}

/// Unset fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNotificationPreferences {
    pub push_enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub sms_enabled: Option<bool>,
}
