use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ApprovalStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
    pub species: Option<String>,
    pub care_instructions: Option<String>,
    pub stock_quantity: i64,
    pub seller_id: Uuid,
    pub verified_by_ai: bool,
    pub is_active: bool,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plant {
    /// Only active, approved listings can be added to carts or ordered.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.approval_status == ApprovalStatus::Approved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlantRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 100_000_000, message = "must be between 1 and 100000000"))]
    pub price_cents: i64,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub category: Option<String>,
    pub species: Option<String>,
    pub care_instructions: Option<String>,
    #[validate(range(min = 0, max = 1_000_000, message = "must be between 0 and 1000000"))]
    pub stock_quantity: i64,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub verified_by_ai: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdatePlantRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 100_000_000, message = "must be between 1 and 100000000"))]
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub species: Option<String>,
    pub care_instructions: Option<String>,
    #[validate(range(min = 0, max = 1_000_000, message = "must be between 0 and 1000000"))]
    pub stock_quantity: Option<i64>,
    pub is_active: Option<bool>,
}

/// Catalog filters; only purchasable plants are returned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantSearch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    #[serde(default)]
    pub verified_only: bool,
}
