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
        announcement::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{AnnouncementRepository, Repository},
    state::AppState,
    types::AnnouncementId,
};

/// Public listing: published announcements only.
pub async fn list_published(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<Announcement>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = AnnouncementRepository::new()
        .find_published_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<AnnouncementId>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = AnnouncementRepository::new()
        .find_published_by_id(&state.pool, id)
        .await?;
    Ok(Json(announcement))
}

/// Admin listing: drafts included.
pub async fn list_all(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<Announcement>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = AnnouncementRepository::new()
        .find_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    payload.validate()?;
    let created = AnnouncementRepository::new()
        .create(&state.pool, &Announcement::new(payload))
        .await?;
    tracing::info!(
        announcement_id = %created.id,
        published = created.is_published,
        "announcement created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<AnnouncementId>,
    Json(payload): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>, AppError> {
    payload.validate()?;
    let repo = AnnouncementRepository::new();
    let mut announcement = repo.find_by_id(&state.pool, id).await?;
    announcement.apply(payload);
    let updated = repo.update(&state.pool, &announcement).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<AnnouncementId>,
) -> Result<Json<Value>, AppError> {
    AnnouncementRepository::new().delete(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Announcement deleted" })))
}
