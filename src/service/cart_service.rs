use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{CartRepository, PlantRepository},
};

/// Stock is checked against the plant at call time; nothing is reserved until checkout.
pub struct CartService {
    repo: Arc<dyn CartRepository>,
    plant_repo: Arc<dyn PlantRepository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>, plant_repo: Arc<dyn PlantRepository>) -> Self {
        Self { repo, plant_repo }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<CartSummary> {
        Ok(self.repo.find_or_create(user_id).await?.into())
    }

    async fn purchasable(&self, plant_id: Uuid, quantity: i64) -> Result<Plant> {
        let plant = self
            .plant_repo
            .find_by_id(plant_id)
            .await?
            .filter(Plant::is_purchasable)
            .ok_or_else(|| AppError::BadRequest("Product not available".to_string()))?;

        if plant.stock_quantity < quantity {
            return Err(AppError::BadRequest("Insufficient stock".to_string()));
        }
        Ok(plant)
    }

    /// Adding a plant already in the cart grows that line and keeps its captured price.
    pub async fn add_item(&self, user_id: Uuid, request: AddCartItemRequest) -> Result<CartSummary> {
        request.validate()?;
        let cart = self.repo.find_or_create(user_id).await?;

        match cart.find_plant(request.plant_id) {
            Some(existing) => {
                let combined = existing
                    .quantity
                    .checked_add(request.quantity)
                    .ok_or_else(|| AppError::BadRequest("Quantity is too large".to_string()))?;
                self.purchasable(request.plant_id, combined).await?;
                self.repo
                    .set_item_quantity(cart.id, existing.id, combined)
                    .await?;
            }
            None => {
                let plant = self.purchasable(request.plant_id, request.quantity).await?;
                self.repo
                    .add_item(cart.id, plant.id, request.quantity, plant.price_cents)
                    .await?;
            }
        }

        self.get(user_id).await
    }

    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        request: UpdateCartItemRequest,
    ) -> Result<CartSummary> {
        request.validate()?;
        let cart = self.repo.find_or_create(user_id).await?;
        let item = cart
            .find_item(item_id)
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        self.purchasable(item.plant_id, request.quantity).await?;
        self.repo
            .set_item_quantity(cart.id, item_id, request.quantity)
            .await?;

        self.get(user_id).await
    }

    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<CartSummary> {
        let cart = self.repo.find_or_create(user_id).await?;
        self.repo.remove_item(cart.id, item_id).await?;
        self.get(user_id).await
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<CartSummary> {
        let cart = self.repo.find_or_create(user_id).await?;
        self.repo.clear(cart.id).await?;
        self.get(user_id).await
    }
}
