use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateReviewRequest, PlantReviews, Review},
    error::Result,
};

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state
        .service_context
        .review_service
        .create(&current.user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn for_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> Result<Json<PlantReviews>> {
    Ok(Json(state.service_context.review_service.for_plant(plant_id).await?))
}
