use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppError,
    models::about::{About, UpsertAboutRequest},
    repositories::AboutRepository,
    state::AppState,
};

pub async fn get(State(state): State<AppState>) -> Result<Json<About>, AppError> {
    let about = AboutRepository::new()
        .find_current(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("About content not found".into()))?;
    Ok(Json(about))
}

pub async fn upsert(
    State(state): State<AppState>,
    Json(payload): Json<UpsertAboutRequest>,
) -> Result<Json<About>, AppError> {
    payload.validate()?;
    let repo = AboutRepository::new();
    let saved = match repo.find_current(&state.pool).await? {
        Some(mut current) => {
            current.replace(payload);
            repo.update(&state.pool, &current).await?
        }
        None => repo.insert(&state.pool, &About::from_payload(payload)).await?,
    };
    Ok(Json(saved))
}
