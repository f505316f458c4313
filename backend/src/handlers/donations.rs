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
            CreateDonationRequest, Donation, DonationListQuery, DonationSummary,
            UpdateDonationRequest,
        },
        PaginatedResponse,
    },
    repositories::{DonationCategoryRepository, DonationRepository, Repository},
    state::AppState,
    types::{DonationCategoryId, DonationId},
};

async fn ensure_category_exists(
    state: &AppState,
    category_id: DonationCategoryId,
) -> Result<(), AppError> {
    if !DonationCategoryRepository::new()
        .exists(&state.pool, category_id)
        .await?
    {
        return Err(AppError::BadRequest("Donation category does not exist".into()));
    }
    Ok(())
}

/// Public aggregate over successful donations.
pub async fn summary(State(state): State<AppState>) -> Result<Json<DonationSummary>, AppError> {
    let summary = DonationRepository::new().summary(&state.pool).await?;
    Ok(Json(summary))
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<DonationListQuery>,
) -> Result<Json<PaginatedResponse<Donation>>, AppError> {
    let status = q.status().map_err(AppError::BadRequest)?;
    let pagination = q.pagination();
    let (limit, offset) = (pagination.limit(), pagination.offset());
    let (data, total) = DonationRepository::new()
        .find_page_by_status(&state.pool, status, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DonationId>,
) -> Result<Json<Donation>, AppError> {
    let donation = DonationRepository::new().find_by_id(&state.pool, id).await?;
    Ok(Json(donation))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<Donation>), AppError> {
    payload.validate()?;
    ensure_category_exists(&state, payload.category_id).await?;
    let created = DonationRepository::new()
        .create(&state.pool, &Donation::new(payload))
        .await?;
    tracing::info!(
        donation_id = %created.id,
        category_id = %created.category_id,
        status = created.payment_status.as_str(),
        "donation recorded"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DonationId>,
    Json(payload): Json<UpdateDonationRequest>,
) -> Result<Json<Donation>, AppError> {
    payload.validate()?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state, category_id).await?;
    }
    let repo = DonationRepository::new();
    let mut donation = repo.find_by_id(&state.pool, id).await?;
    donation.apply(payload);
    let updated = repo.update(&state.pool, &donation).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DonationId>,
) -> Result<Json<Value>, AppError> {
    DonationRepository::new().delete(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Donation deleted" })))
}
