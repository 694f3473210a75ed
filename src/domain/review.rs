use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plant_id: Uuid,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub plant_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i64,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantReviews {
    pub plant_id: Uuid,
    pub average_rating: f64,
    pub review_count: i64,
    pub reviews: Vec<Review>,
}
