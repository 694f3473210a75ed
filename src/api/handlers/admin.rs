use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{handlers::orders::invoice_response, middleware::auth::CurrentUser, state::AppState},
    domain::*,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub status: ApprovalStatus,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementFilter {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<AdminDashboard>> {
    Ok(Json(state.service_context.analytics_service.admin_dashboard().await?))
}

pub async fn user_stats(State(state): State<AppState>) -> Result<Json<UserStats>> {
    Ok(Json(state.service_context.analytics_service.user_stats().await?))
}

pub async fn plant_stats(State(state): State<AppState>) -> Result<Json<PlantStats>> {
    Ok(Json(state.service_context.analytics_service.plant_stats().await?))
}

pub async fn order_stats(State(state): State<AppState>) -> Result<Json<AdminOrderStats>> {
    Ok(Json(state.service_context.analytics_service.order_stats().await?))
}

pub async fn revenue_stats(State(state): State<AppState>) -> Result<Json<RevenueStats>> {
    Ok(Json(state.service_context.analytics_service.revenue_stats().await?))
}

pub async fn top_sellers(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<TopSeller>>> {
    Ok(Json(
        state
            .service_context
            .analytics_service
            .top_sellers(params.limit)
            .await?,
    ))
}

pub async fn recent_orders(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<RecentOrder>>> {
    Ok(Json(
        state
            .service_context
            .analytics_service
            .recent_orders(params.limit)
            .await?,
    ))
}

pub async fn recent_plants(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<RecentPlant>>> {
    Ok(Json(
        state
            .service_context
            .analytics_service
            .recent_plants(params.limit)
            .await?,
    ))
}

pub async fn set_vendor_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<User>> {
    Ok(Json(
        state
            .service_context
            .user_service
            .set_vendor_status(&current.user, id, request.status)
            .await?,
    ))
}

pub async fn set_plant_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<Plant>> {
    Ok(Json(
        state
            .service_context
            .catalog_service
            .set_approval_status(id, request.status)
            .await?,
    ))
}

pub async fn order_invoice(
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

pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let announcement = state
        .service_context
        .announcement_service
        .create(&current.user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn list_announcements(
    State(state): State<AppState>,
    Query(filter): Query<AnnouncementFilter>,
) -> Result<Json<Vec<Announcement>>> {
    Ok(Json(
        state
            .service_context
            .announcement_service
            .list(filter.include_inactive)
            .await?,
    ))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .announcement_service
        .deactivate(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<AppState>) -> Json<SystemHealth> {
    Json(state.service_context.analytics_service.system_health().await)
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<AdminCreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .service_context
        .user_service
        .admin_create(&current.user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<User>>> {
    Ok(Json(
        state
            .service_context
            .user_service
            .list(&filter, page)
            .await?,
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    Ok(Json(state.service_context.user_service.get(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> Result<Json<User>> {
    Ok(Json(
        state
            .service_context
            .user_service
            .admin_update(&current.user, id, request)
            .await?,
    ))
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(filter): Query<AuditLogFilter>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<AuditLog>>> {
    Ok(Json(
        state
            .service_context
            .audit_service
            .list(&filter, page)
            .await?,
    ))
}

pub async fn get_audit_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuditLog>> {
    Ok(Json(state.service_context.audit_service.get(id).await?))
}

pub async fn create_store(
    State(state): State<AppState>,
    Json(request): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>)> {
    let store = state.service_context.store_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

pub async fn list_stores(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Store>>> {
    Ok(Json(state.service_context.store_service.list(page).await?))
}
