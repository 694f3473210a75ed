use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{AddCartItemRequest, CartSummary, UpdateCartItemRequest},
    error::Result,
};

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.service_context.cart_service.get(current.user.id).await?))
}

pub async fn add_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<AddCartItemRequest>,
) -> Result<Json<CartSummary>> {
    let cart = state
        .service_context
        .cart_service
        .add_item(current.user.id, request)
        .await?;
    Ok(Json(cart))
}

pub async fn update_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartSummary>> {
    let cart = state
        .service_context
        .cart_service
        .update_item(current.user.id, item_id, request)
        .await?;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<CartSummary>> {
    let cart = state
        .service_context
        .cart_service
        .remove_item(current.user.id, item_id)
        .await?;
    Ok(Json(cart))
}

pub async fn clear(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.service_context.cart_service.clear(current.user.id).await?))
}
