use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CodConfirmRequest, CreateGatewayOrderRequest, GatewayOrder, Payment, PaymentWebhook},
    error::Result,
};

pub async fn create_razorpay_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateGatewayOrderRequest>,
) -> Result<(StatusCode, Json<GatewayOrder>)> {
    let order = state
        .service_context
        .payment_service
        .create_gateway_order(&current.user, request.order_id)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Gateway callback; authenticated by signature rather than session.
pub async fn razorpay_webhook(
    State(state): State<AppState>,
    Json(webhook): Json<PaymentWebhook>,
) -> Result<Json<Payment>> {
    Ok(Json(
        state
            .service_context
            .payment_service
            .handle_webhook(webhook)
            .await?,
    ))
}

pub async fn confirm_cod(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CodConfirmRequest>,
) -> Result<Json<Payment>> {
    Ok(Json(
        state
            .service_context
            .payment_service
            .confirm_cod(&current.user, request.order_id)
            .await?,
    ))
}
