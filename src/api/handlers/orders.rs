use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::*,
    error::Result,
    service::RenderedInvoice,
};

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

pub(crate) fn invoice_response(invoice: RenderedInvoice) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, invoice.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", invoice.filename),
            ),
        ],
        invoice.body,
    )
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let order = state
        .service_context
        .order_service
        .create(current.user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn checkout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let response = state
        .service_context
        .order_service
        .checkout(current.user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Order>>> {
    Ok(Json(
        state
            .service_context
            .order_service
            .list_as_buyer(&current.user, page)
            .await?,
    ))
}

pub async fn list_seller(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Order>>> {
    Ok(Json(
        state
            .service_context
            .order_service
            .list_as_seller(&current.user, page)
            .await?,
    ))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<OrderStats>> {
    Ok(Json(state.service_context.order_service.stats(&current.user).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithItems>> {
    Ok(Json(state.service_context.order_service.get(&current.user, id).await?))
}

pub async fn timeline(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEntry>>> {
    Ok(Json(
        state
            .service_context
            .order_service
            .timeline(&current.user, id)
            .await?,
    ))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let order = state
        .service_context
        .order_service
        .update_status(&current.user, id, request.status)
        .await?;
    Ok(Json(order))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    Ok(Json(state.service_context.order_service.cancel(&current.user, id).await?))
}

pub async fn assign_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDeliveryRequest>,
) -> Result<Json<Order>> {
    let order = state
        .service_context
        .order_service
        .assign_delivery(id, request.delivery_agent_id)
        .await?;
    Ok(Json(order))
}

pub async fn invoice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let invoice = state
        .service_context
        .order_service
        .invoice(&current.user, id)
        .await?;
    Ok(invoice_response(invoice))
}
