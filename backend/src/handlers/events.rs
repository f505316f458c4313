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
        event::{CreateEventRequest, Event, UpdateEventRequest},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{EventRepository, Repository},
    state::AppState,
    types::EventId,
};

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<Event>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = EventRepository::new()
        .find_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, AppError> {
    let item = EventRepository::new().find_by_id(&state.pool, id).await?;
    Ok(Json(item))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    payload.validate()?;
    let created = EventRepository::new()
        .create(&state.pool, &Event::new(payload))
        .await?;
    tracing::info!(event_id = %created.id, "event created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    payload.validate()?;
    let repo = EventRepository::new();
    let mut item = repo.find_by_id(&state.pool, id).await?;
    item.apply(payload);
    let updated = repo.update(&state.pool, &item).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Value>, AppError> {
    EventRepository::new().delete(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Event deleted" })))
}
