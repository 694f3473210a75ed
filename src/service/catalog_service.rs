use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::BlobStorage,
    repository::PlantRepository,
};

pub struct CatalogService {
    repo: Arc<dyn PlantRepository>,
    storage: Arc<dyn BlobStorage>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn PlantRepository>, storage: Arc<dyn BlobStorage>) -> Self {
        Self { repo, storage }
    }

    /// Admin-tier listings go live immediately; vendor listings wait for moderation.
    #[instrument(skip(self, actor, request), fields(seller_id = %actor.id))]
    pub async fn create(&self, actor: &User, request: CreatePlantRequest) -> Result<Plant> {
        request.validate()?;
        if !actor.can_sell() {
            return Err(AppError::Forbidden(
                "Only approved vendors can list plants".to_string(),
            ));
        }

        let approval = if actor.can_manage_platform() {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        };
        let plant = self.repo.create(actor.id, &request, approval).await?;

        info!(plant_id = %plant.id, "Plant listed");
        Ok(plant)
    }

    pub async fn get(&self, id: Uuid) -> Result<Plant> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))
    }

    pub async fn search(&self, filter: &PlantSearch, page: PageParams) -> Result<Page<Plant>> {
        let (plants, total) = self.repo.search(filter, page).await?;
        Ok(Page::new(plants, total, page))
    }

    pub async fn list_mine(&self, actor: &User) -> Result<Vec<Plant>> {
        self.repo.list_by_seller(actor.id).await
    }

    async fn owned(&self, actor: &User, id: Uuid) -> Result<Plant> {
        let plant = self.get(id).await?;
        if !actor.can_manage_plant(plant.seller_id) {
            return Err(AppError::Forbidden(
                "Not authorized to modify this plant".to_string(),
            ));
        }
        Ok(plant)
    }

    pub async fn update(&self, actor: &User, id: Uuid, update: UpdatePlantRequest) -> Result<Plant> {
        update.validate()?;
        self.owned(actor, id).await?;
        self.repo.update(id, &update).await
    }

    /// Soft delete: the listing is hidden but order history keeps its reference.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<()> {
        self.owned(actor, id).await?;
        self.repo.deactivate(id).await?;
        info!(plant_id = %id, "Plant deactivated");
        Ok(())
    }

    pub async fn upload_image(
        &self,
        actor: &User,
        id: Uuid,
        filename: &str,
        data: &[u8],
    ) -> Result<Plant> {
        self.owned(actor, id).await?;
        let url = self.storage.store(filename, data).await?;
        self.repo.set_image_url(id, &url).await
    }

    #[instrument(skip(self))]
    pub async fn set_approval_status(&self, id: Uuid, status: ApprovalStatus) -> Result<Plant> {
        let plant = self.repo.set_approval_status(id, status).await?;
        info!(plant_id = %id, status = status.as_str(), "Plant moderation updated");
        Ok(plant)
    }
}
