use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        DeviceToken, NotificationPreferences, RegisterDeviceTokenRequest,
        UpdateNotificationPreferences,
    },
    error::Result,
};

pub async fn register_token(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<RegisterDeviceTokenRequest>,
) -> Result<(StatusCode, Json<DeviceToken>)> {
    let token = state
        .service_context
        .notification_service
        .register_token(current.user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn list_tokens(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<DeviceToken>>> {
    Ok(Json(
        state
            .service_context
            .notification_service
            .device_tokens(current.user.id)
            .await?,
    ))
}

pub async fn preferences(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<NotificationPreferences>> {
    Ok(Json(
        state
            .service_context
            .notification_service
            .preferences(current.user.id)
            .await?,
    ))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(update): Json<UpdateNotificationPreferences>,
) -> Result<Json<NotificationPreferences>> {
    Ok(Json(
        state
            .service_context
            .notification_service
            .update_preferences(current.user.id, update)
            .await?,
    ))
}
