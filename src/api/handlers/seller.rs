use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{SellerDashboard, SellerEarnings, SellerPerformance, SellerStats, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct PerformanceParams {
    pub days: Option<i64>,
}

fn seller(current: CurrentUser) -> Result<User> {
    if !current.user.can_sell() {
        return Err(AppError::Forbidden("Seller access required".to_string()));
    }
    Ok(current.user)
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SellerDashboard>> {
    let user = seller(current)?;
    Ok(Json(
        state
            .service_context
            .analytics_service
            .seller_dashboard(user.id)
            .await?,
    ))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SellerStats>> {
    let user = seller(current)?;
    Ok(Json(
        state
            .service_context
            .analytics_service
            .seller_stats(user.id)
            .await?,
    ))
}

pub async fn earnings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SellerEarnings>> {
    let user = seller(current)?;
    Ok(Json(
        state
            .service_context
            .analytics_service
            .seller_earnings(user.id)
            .await?,
    ))
}

pub async fn performance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<PerformanceParams>,
) -> Result<Json<SellerPerformance>> {
    let user = seller(current)?;
    Ok(Json(
        state
            .service_context
            .analytics_service
            .seller_performance(user.id, params.days)
            .await?,
    ))
}
