use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreatePlantRequest, Page, PageParams, Plant, PlantSearch, Prediction, UpdatePlantRequest},
    error::{AppError, Result},
};

/// First `file` (or `image`) part of a multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if matches!(field.name(), Some("file") | Some("image")) {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            return Ok((filename, data.to_vec()));
        }
    }

    Err(AppError::Validation("file: an image upload is required".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(search): Query<PlantSearch>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Plant>>> {
    let plants = state.service_context.catalog_service.search(&search, page).await?;
    Ok(Json(plants))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Plant>> {
    Ok(Json(state.service_context.catalog_service.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreatePlantRequest>,
) -> Result<(StatusCode, Json<Plant>)> {
    let plant = state
        .service_context
        .catalog_service
        .create(&current.user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(plant)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePlantRequest>,
) -> Result<Json<Plant>> {
    let plant = state
        .service_context
        .catalog_service
        .update(&current.user, id, request)
        .await?;
    Ok(Json(plant))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .catalog_service
        .delete(&current.user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Plant>>> {
    Ok(Json(
        state
            .service_context
            .catalog_service
            .list_mine(&current.user)
            .await?,
    ))
}

pub async fn upload_image(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Plant>> {
    let (filename, data) = read_upload(multipart).await?;
    let plant = state
        .service_context
        .catalog_service
        .upload_image(&current.user, id, &filename, &data)
        .await?;
    Ok(Json(plant))
}

pub async fn identify(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<Prediction>> {
    let (filename, data) = read_upload(multipart).await?;
    let prediction = state
        .service_context
        .vision_service
        .identify(&current.user, &filename, &data)
        .await?;
    Ok(Json(prediction))
}

pub async fn predictions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Prediction>>> {
    Ok(Json(
        state
            .service_context
            .vision_service
            .history(&current.user)
            .await?,
    ))
}
