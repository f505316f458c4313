use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::upload::{discard_on_error, save_media, JsonOrForm, UploadForm},
    models::{
        gallery::{CreateGalleryRequest, GalleryItem, UpdateGalleryRequest},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{GalleryRepository, Repository},
    services::upload::IMAGE_TYPES,
    state::AppState,
    types::GalleryId,
};

const IMAGE_ONLY: &str = "Invalid file type. Only jpg, jpeg, png, webp are allowed";

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<GalleryItem>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = GalleryRepository::new()
        .find_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<GalleryId>,
) -> Result<Json<GalleryItem>, AppError> {
    let item = GalleryRepository::new().find_by_id(&state.pool, id).await?;
    Ok(Json(item))
}

pub async fn create(
    State(state): State<AppState>,
    body: JsonOrForm<CreateGalleryRequest>,
) -> Result<(StatusCode, Json<GalleryItem>), AppError> {
    let (payload, stored) = match body {
        JsonOrForm::Json(payload) => (payload, None),
        JsonOrForm::Form(mut multipart) => {
            let mut form = UploadForm::read(&mut multipart, state.uploads.max_size()).await?;
            let title = form.require("title", "Title is required")?;
            let file = form.take_file()?;
            let stored = save_media(&state, &file, IMAGE_TYPES, IMAGE_ONLY).await?;
            let payload = CreateGalleryRequest {
                title,
                description: form.text("description"),
                image_url: stored.url.clone(),
            };
            (payload, Some(stored))
        }
    };

    let result = async {
        payload.validate()?;
        GalleryRepository::new()
            .create(&state.pool, &GalleryItem::new(payload))
            .await
    }
    .await;
    let created = discard_on_error(&state, stored.as_ref(), result).await?;
    tracing::info!(gallery_id = %created.id, "gallery item created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<GalleryId>,
    body: JsonOrForm<UpdateGalleryRequest>,
) -> Result<Json<GalleryItem>, AppError> {
    let (payload, stored) = match body {
        JsonOrForm::Json(payload) => (payload, None),
        JsonOrForm::Form(mut multipart) => {
            let mut form = UploadForm::read(&mut multipart, state.uploads.max_size()).await?;
            let stored = match form.file.take() {
                Some(file) if !file.name.is_empty() => {
                    Some(save_media(&state, &file, IMAGE_TYPES, IMAGE_ONLY).await?)
                }
                _ => None,
            };
            let payload = UpdateGalleryRequest {
                title: form.text("title"),
                description: form.text("description"),
                image_url: stored.as_ref().map(|file| file.url.clone()),
            };
            (payload, stored)
        }
    };

    let repo = GalleryRepository::new();
    let result = async {
        payload.validate()?;
        let mut item = repo.find_by_id(&state.pool, id).await?;
        let previous = item.image_url.clone();
        item.apply(payload);
        Ok::<_, AppError>((repo.update(&state.pool, &item).await?, previous))
    }
    .await;
    let (updated, previous) = discard_on_error(&state, stored.as_ref(), result).await?;
    if stored.is_some() && previous != updated.image_url {
        state.uploads.remove_url(&previous).await;
    }
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<GalleryId>,
) -> Result<Json<Value>, AppError> {
    GalleryRepository::new().delete(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Gallery item deleted" })))
}
