use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().fold(0, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Total at the prices captured when each line was added.
    pub fn total_price_cents(&self) -> i64 {
        self.items
            .iter()
            .fold(0, |acc, i| acc.saturating_add(i.subtotal_cents()))
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn find_plant(&self, plant_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.plant_id == plant_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub plant_id: Uuid,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(self.quantity)
    }
}

/// A cart with its running totals, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSummary {
    #[serde(flatten)]
    pub cart: Cart,
    pub total_quantity: i64,
    pub total_price_cents: i64,
}

impl From<Cart> for CartSummary {
    fn from(cart: Cart) -> Self {
        Self {
            total_quantity: cart.total_quantity(),
            total_price_cents: cart.total_price_cents(),
            cart,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddCartItemRequest {
    pub plant_id: Uuid,
    #[validate(range(min = 1, max = 1000, message = "must be between 1 and 1000"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, max = 1000, message = "must be between 1 and 1000"))]
    pub quantity: i64,
}
