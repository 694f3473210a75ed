use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{NearbyQuery, NearbyStore, Page, PageParams, Store},
    error::Result,
};

pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<NearbyStore>>> {
    Ok(Json(
        state
            .service_context
            .store_service
            .nearby(&query, page)
            .await?,
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Store>> {
    Ok(Json(state.service_context.store_service.get(id).await?))
}
