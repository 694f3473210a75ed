use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{Prediction, User},
    error::Result,
    integrations::{storage::image_extension, BlobStorage, PlantClassifier},
    repository::PredictionRepository,
};

const HISTORY_LIMIT: i64 = 50;

/// Runs uploads through the classifier and keeps a history per user.
pub struct VisionService {
    repo: Arc<dyn PredictionRepository>,
    classifier: Arc<dyn PlantClassifier>,
    storage: Arc<dyn BlobStorage>,
}

impl VisionService {
    pub fn new(
        repo: Arc<dyn PredictionRepository>,
        classifier: Arc<dyn PlantClassifier>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            repo,
            classifier,
            storage,
        }
    }

    pub async fn identify(&self, actor: &User, filename: &str, image: &[u8]) -> Result<Prediction> {
        image_extension(filename)?;
        let classification = self.classifier.classify(image).await?;
        let image_url = self.storage.store(filename, image).await?;

        let prediction = Prediction {
            id: Uuid::new_v4(),
            image_url,
            is_plant: classification.is_plant,
            plant_type: classification.plant_type,
            confidence: classification.confidence,
            uploaded_by: Some(actor.id),
            created_at: Utc::now(),
        };
        self.repo.create(&prediction).await?;

        info!(prediction_id = %prediction.id, is_plant = prediction.is_plant, "Image classified");
        Ok(prediction)
    }

    pub async fn history(&self, actor: &User) -> Result<Vec<Prediction>> {
        self.repo.list_by_user(actor.id, HISTORY_LIMIT).await
    }
}
