use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::*,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct AgentFilter {
    pub status: Option<AgentStatus>,
}

pub async fn create_agent(
    State(state): State<AppState>,
    Json(request): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<DeliveryAgent>)> {
    let agent = state.service_context.delivery_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn list_agents(
    State(state): State<AppState>,
    Query(filter): Query<AgentFilter>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<DeliveryAgent>>> {
    Ok(Json(
        state
            .service_context
            .delivery_service
            .list(filter.status, page)
            .await?,
    ))
}

pub async fn available_agents(State(state): State<AppState>) -> Result<Json<Vec<DeliveryAgent>>> {
    Ok(Json(state.service_context.delivery_service.available().await?))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryAgent>> {
    Ok(Json(state.service_context.delivery_service.get(id).await?))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAgentRequest>,
) -> Result<Json<DeliveryAgent>> {
    Ok(Json(
        state
            .service_context
            .delivery_service
            .update(id, request)
            .await?,
    ))
}

pub async fn set_agent_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAgentStatusRequest>,
) -> Result<Json<DeliveryAgent>> {
    Ok(Json(
        state
            .service_context
            .delivery_service
            .set_status(id, request.status)
            .await?,
    ))
}

pub async fn agent_orders(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.service_context.delivery_service.orders_for(id).await?))
}

pub async fn complete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<CompleteDeliveryRequest>,
) -> Result<Json<Order>> {
    let order = state
        .service_context
        .order_service
        .complete_delivery(order_id, request.delivery_agent_id)
        .await?;
    Ok(Json(order))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<DeliveryStats>> {
    Ok(Json(state.service_context.delivery_service.stats().await?))
}
