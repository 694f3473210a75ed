use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output of the vision classifier for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_plant: bool,
    pub plant_type: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub image_url: String,
    pub is_plant: bool,
    pub plant_type: Option<String>,
    pub confidence: f64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
