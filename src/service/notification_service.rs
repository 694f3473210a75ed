use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        DeviceToken, NotificationPreferences, RegisterDeviceTokenRequest,
        UpdateNotificationPreferences,
    },
    error::Result,
    repository::NotificationRepository,
};

/// Device registration and per-user channel preferences. Delivery itself is
/// left to whatever push provider consumes these records.
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn register_token(
        &self,
        user_id: Uuid,
        request: RegisterDeviceTokenRequest,
    ) -> Result<DeviceToken> {
        request.validate()?;
        let token = self.repo.upsert_device_token(user_id, &request).await?;
        info!(%user_id, platform = ?token.platform, "Device token registered");
        Ok(token)
    }

    pub async fn device_tokens(&self, user_id: Uuid) -> Result<Vec<DeviceToken>> {
        self.repo.device_tokens(user_id).await
    }

    /// Stored preferences, or the defaults (push only) when none were saved.
    pub async fn preferences(&self, user_id: Uuid) -> Result<NotificationPreferences> {
        self.repo.preferences(user_id).await
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        update: UpdateNotificationPreferences,
    ) -> Result<NotificationPreferences> {
        self.repo.update_preferences(user_id, &update).await
    }
}
