use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;

use crate::{
    error::AppError,
    services::upload::{mime_for, StoredFile},
    state::AppState,
};

pub const FILE_FIELD: &str = "file";

/// Body of a write endpoint that takes either JSON or a multipart form.
pub enum JsonOrForm<T> {
    Json(T),
    Form(Multipart),
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));
        if is_form {
            Multipart::from_request(req, state)
                .await
                .map(Self::Form)
                .map_err(IntoResponse::into_response)
        } else {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(payload)| Self::Json(payload))
                .map_err(IntoResponse::into_response)
        }
    }
}

pub struct FilePart {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Text fields plus the optional `file` part of a multipart form.
#[derive(Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<FilePart>,
}

impl UploadForm {
    /// Reads the whole form. The file part is streamed and abandoned as soon
    /// as it grows past `max_size`.
    pub async fn read(multipart: &mut Multipart, max_size: usize) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(mut field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(key) = field.name().map(str::to_string) else {
                continue;
            };
            if key == FILE_FIELD {
                let name = field.file_name().unwrap_or_default().to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(bad_form)? {
                    if bytes.len() + chunk.len() > max_size {
                        return Err(AppError::BadRequest(format!(
                            "File size exceeds maximum allowed size ({} bytes)",
                            max_size
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                form.file = Some(FilePart { name, bytes });
            } else {
                let value = field.text().await.map_err(bad_form)?;
                form.fields.insert(key, value);
            }
        }
        Ok(form)
    }

    /// Trimmed, non-empty value of a text field.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn require(&self, key: &str, message: &str) -> Result<String, AppError> {
        self.text(key)
            .ok_or_else(|| AppError::BadRequest(message.to_string()))
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, AppError> {
        self.text(key)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid value for '{}'", key)))
            })
            .transpose()
    }

    pub fn take_file(&mut self) -> Result<FilePart, AppError> {
        self.file
            .take()
            .filter(|file| !file.name.is_empty())
            .ok_or_else(|| AppError::BadRequest("File is required".to_string()))
    }
}

/// Saves `file` if its type is one of `accepted`, otherwise rejects it with
/// `message` before anything is written.
pub async fn save_media(
    state: &AppState,
    file: &FilePart,
    accepted: &[&str],
    message: &str,
) -> Result<StoredFile, AppError> {
    if !accepted.contains(&mime_for(&file.name)) {
        return Err(AppError::BadRequest(message.to_string()));
    }
    Ok(state.uploads.save(&file.name, &file.bytes).await?)
}

/// Deletes a freshly stored file when the write it belonged to failed.
pub async fn discard_on_error<T>(
    state: &AppState,
    stored: Option<&StoredFile>,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    if let (Err(_), Some(file)) = (&result, stored) {
        state.uploads.remove(&file.filename).await;
    }
    result
}

fn bad_form(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut form = UploadForm::read(&mut multipart, state.uploads.max_size()).await?;
    let file = form.take_file()?;
    let stored = state.uploads.save(&file.name, &file.bytes).await?;
    Ok(Json(json!({
        "message": "File uploaded successfully",
        "data": stored,
    })))
}
