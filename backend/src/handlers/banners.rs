use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::upload::{discard_on_error, save_media, FilePart, JsonOrForm, UploadForm},
    models::{
        banner::{Banner, BannerType, CreateBannerRequest, UpdateBannerRequest},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{BannerRepository, Repository},
    services::{
        upload::{IMAGE_TYPES, VIDEO_TYPES},
        StoredFile,
    },
    state::AppState,
    types::BannerId,
};

async fn save_banner_media(
    state: &AppState,
    banner_type: BannerType,
    file: &FilePart,
) -> Result<StoredFile, AppError> {
    match banner_type {
        BannerType::Image => {
            let message = "Invalid file type for image banner. Only jpg, jpeg, png, webp are allowed";
            save_media(state, file, IMAGE_TYPES, message).await
        }
        BannerType::Video => {
            let message = "Invalid file type for video banner. Only mp4 is allowed";
            save_media(state, file, VIDEO_TYPES, message).await
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<Banner>>, AppError> {
    let (limit, offset) = (q.limit(), q.offset());
    let (data, total) = BannerRepository::new()
        .find_page(&state.pool, limit, offset)
        .await?;
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
) -> Result<Json<Banner>, AppError> {
    let item = BannerRepository::new().find_by_id(&state.pool, id).await?;
    Ok(Json(item))
}

pub async fn create(
    State(state): State<AppState>,
    body: JsonOrForm<CreateBannerRequest>,
) -> Result<(StatusCode, Json<Banner>), AppError> {
    let (payload, stored) = match body {
        JsonOrForm::Json(payload) => (payload, None),
        JsonOrForm::Form(mut multipart) => {
            let mut form = UploadForm::read(&mut multipart, state.uploads.max_size()).await?;
            let title = form.require("title", "Title is required")?;
            let banner_type: BannerType = form
                .parse("type")?
                .ok_or_else(|| AppError::BadRequest("Type is required".to_string()))?;
            let link_url = form.text("link_url");
            let is_active = form.parse("is_active")?;
            let sort_order = form.parse("sort_order")?;
            let file = form.take_file()?;
            let stored = save_banner_media(&state, banner_type, &file).await?;
            let payload = CreateBannerRequest {
                title,
                description: form.text("description"),
                media_url: stored.url.clone(),
                banner_type: Some(banner_type),
                link_url,
                is_active,
                sort_order,
            };
            (payload, Some(stored))
        }
    };

    let result = async {
        payload.validate()?;
        BannerRepository::new()
            .create(&state.pool, &Banner::new(payload))
            .await
    }
    .await;
    let created = discard_on_error(&state, stored.as_ref(), result).await?;
    tracing::info!(banner_id = %created.id, "banner created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
    body: JsonOrForm<UpdateBannerRequest>,
) -> Result<Json<Banner>, AppError> {
    let repo = BannerRepository::new();
    let (payload, stored) = match body {
        JsonOrForm::Json(payload) => (payload, None),
        JsonOrForm::Form(mut multipart) => {
            let mut form = UploadForm::read(&mut multipart, state.uploads.max_size()).await?;
            let mut payload = UpdateBannerRequest {
                title: form.text("title"),
                description: form.text("description"),
                media_url: None,
                banner_type: form.parse("type")?,
                link_url: form.text("link_url"),
                is_active: form.parse("is_active")?,
                sort_order: form.parse("sort_order")?,
            };
            let stored = match form.file.take() {
                Some(file) if !file.name.is_empty() => {
                    let banner_type = match payload.banner_type {
                        Some(banner_type) => banner_type,
                        None => repo.find_by_id(&state.pool, id).await?.banner_type,
                    };
                    Some(save_banner_media(&state, banner_type, &file).await?)
                }
                _ => None,
            };
            payload.media_url = stored.as_ref().map(|file| file.url.clone());
            (payload, stored)
        }
    };

    let result = async {
        payload.validate()?;
        let mut item = repo.find_by_id(&state.pool, id).await?;
        let previous = item.media_url.clone();
        item.apply(payload);
        Ok::<_, AppError>((repo.update(&state.pool, &item).await?, previous))
    }
    .await;
    let (updated, previous) = discard_on_error(&state, stored.as_ref(), result).await?;
    if stored.is_some() && previous != updated.media_url {
        state.uploads.remove_url(&previous).await;
    }
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
) -> Result<Json<Value>, AppError> {
    BannerRepository::new().delete(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Banner deleted" })))
}
