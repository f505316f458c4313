use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        donation::{
            CreateDonationCategoryRequest, DonationCategory, UpdateDonationCategoryRequest,
        },
        PaginatedResponse, PaginationQuery,
    },
    repositories::{DonationCategoryRepository, Repository},
    state::AppState,
    types::DonationCategoryId,
};

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("Donation category '{}' already exists", name))
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<DonationCategory>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = DonationCategoryRepository::new()
        .find_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DonationCategoryId>,
) -> Result<Json<DonationCategory>, AppError> {
    let category = DonationCategoryRepository::new()
        .find_by_id(&state.pool, id)
        .await?;
    Ok(Json(category))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateDonationCategoryRequest>,
) -> Result<(StatusCode, Json<DonationCategory>), AppError> {
    payload.validate()?;
    let name = payload.name.trim().to_string();
    let repo = DonationCategoryRepository::new();
    if repo.name_taken(&state.pool, &name, None).await? {
        return Err(duplicate_name(&name));
    }

    let category = DonationCategory::new(name, payload.description);
    let created = repo.create(&state.pool, &category).await?;
    tracing::info!(category_id = %created.id, "donation category created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DonationCategoryId>,
    Json(mut payload): Json<UpdateDonationCategoryRequest>,
) -> Result<Json<DonationCategory>, AppError> {
    payload.validate()?;
    let repo = DonationCategoryRepository::new();
    let mut category = repo.find_by_id(&state.pool, id).await?;

    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        if repo.name_taken(&state.pool, name, Some(id)).await? {
            return Err(duplicate_name(name));
        }
    }

    category.apply(payload);
    let updated = repo.update(&state.pool, &category).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DonationCategoryId>,
) -> Result<Json<Value>, AppError> {
    DonationCategoryRepository::new()
        .delete(&state.pool, id)
        .await?;
    Ok(Json(json!({ "message": "Donation category deleted" })))
}
