use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::{
        kajian::{Kajian, SyncQuery, SyncResponse},
        PaginatedResponse, PaginationQuery,
    },
    repositories::KajianRepository,
    services::PgKajianSink,
    state::AppState,
    types::KajianId,
};

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<Kajian>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = KajianRepository::new()
        .find_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<KajianId>,
) -> Result<Json<Kajian>, AppError> {
    let kajian = KajianRepository::new().find_by_id(&state.pool, id).await?;
    Ok(Json(kajian))
}

pub async fn sync(
    State(state): State<AppState>,
    Query(q): Query<SyncQuery>,
) -> Result<Json<SyncResponse>, AppError> {
    let sink = PgKajianSink::new(state.pool.clone());
    let result = state.kajian_sync.sync(&sink, q.days()).await?;
    Ok(Json(result))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<KajianId>,
) -> Result<Json<Value>, AppError> {
    KajianRepository::new().delete(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Kajian deleted" })))
}
