use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{Announcement, CreateAnnouncementRequest, User},
    error::Result,
    repository::AnnouncementRepository,
};

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, actor: &User, request: CreateAnnouncementRequest) -> Result<Announcement> {
        request.validate()?;
        let announcement = self.repo.create(&request, Some(actor.id)).await?;
        info!(announcement_id = %announcement.id, "Announcement published");
        Ok(announcement)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Announcement>> {
        self.repo.list(!include_inactive).await
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<()> {
        self.repo.deactivate(id).await
    }
}
