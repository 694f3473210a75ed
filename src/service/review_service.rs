use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{PlantRepository, ReviewRepository},
};

pub struct ReviewService {
    repo: Arc<dyn ReviewRepository>,
    plant_repo: Arc<dyn PlantRepository>,
}

impl ReviewService {
    pub fn new(repo: Arc<dyn ReviewRepository>, plant_repo: Arc<dyn PlantRepository>) -> Self {
        Self { repo, plant_repo }
    }

    pub async fn create(&self, actor: &User, request: CreateReviewRequest) -> Result<Review> {
        request.validate()?;
        let plant = self
            .plant_repo
            .find_by_id(request.plant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
        if !plant.is_active {
            return Err(AppError::BadRequest("Product not available".to_string()));
        }
        self.repo.create(actor.id, &request).await
    }

    pub async fn for_plant(&self, plant_id: Uuid) -> Result<PlantReviews> {
        let reviews = self.repo.list_by_plant(plant_id).await?;
        let review_count = reviews.len() as i64;
        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            reviews.iter().map(|r| r.rating as f64).sum::<f64>() / review_count as f64
        };

        Ok(PlantReviews {
            plant_id,
            average_rating,
            review_count,
            reviews,
        })
    }
}
