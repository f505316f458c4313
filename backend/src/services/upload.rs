//! Stores uploaded media under the configured upload directory.
//!
//! Files are checked for size and MIME type (derived from the extension)
//! before anything touches the disk, then written under a unique name so
//! concurrent uploads of `photo.jpg` never collide.

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::AppError;

pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];
pub const VIDEO_TYPES: &[&str] = &["video/mp4"];

const FALLBACK_NAME_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File size exceeds maximum allowed size ({max} bytes)")]
    TooLarge { max: usize },
    #[error("File type '{0}' is not allowed")]
    TypeNotAllowed(String),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(_) => AppError::InternalServerError(anyhow::Error::new(err)),
            rejected => AppError::BadRequest(rejected.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub original_name: String,
    pub url: String,
    pub mime_type: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    public_url: String,
    max_size: usize,
    allowed_types: Arc<[String]>,
}

impl UploadStore {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            root: PathBuf::from(&config.path),
            public_url: config.public_url.trim_end_matches('/').to_string(),
            max_size: config.max_size,
            allowed_types: config.allowed_types.clone().into(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_size {
            return Err(UploadError::TooLarge { max: self.max_size });
        }
        Ok(())
    }

    /// MIME type of `original_name` if the configured list allows it.
    pub fn check_type(&self, original_name: &str) -> Result<&'static str, UploadError> {
        let mime = mime_for(original_name);
        if self.allowed_types.iter().any(|allowed| allowed == mime) {
            Ok(mime)
        } else {
            Err(UploadError::TypeNotAllowed(mime.to_string()))
        }
    }

    /// Validates and writes `bytes`, returning where it can be fetched.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        self.check_size(bytes.len())?;
        let mime_type = self.check_type(original_name)?;

        tokio::fs::create_dir_all(&self.root).await?;
        let filename = unique_filename(original_name);
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        tracing::info!(filename = %filename, size = bytes.len(), mime_type, "file uploaded");
        Ok(StoredFile {
            url: format!("{}/{}", self.public_url, filename),
            filename,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
        })
    }

    /// Best-effort delete of a stored file.
    pub async fn remove(&self, filename: &str) {
        if !is_plain_filename(filename) {
            return;
        }
        if let Err(err) = tokio::fs::remove_file(self.root.join(filename)).await {
            tracing::warn!(filename = %filename, error = %err, "failed to delete uploaded file");
        }
    }

    /// Deletes the file behind `url` when it points into this store.
    pub async fn remove_url(&self, url: &str) {
        if let Some(filename) = url
            .strip_prefix(&self.public_url)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            self.remove(filename).await;
        }
    }
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn mime_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// `<unix seconds>_<uuid>_<sanitized stem>.<ext>`
pub fn unique_filename(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let (stem, ext) = match extension(base) {
        Some(ext) => (&base[..base.len() - ext.len() - 1], Some(ext)),
        None => (base, None),
    };

    let mut safe: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if safe.trim_matches('_').is_empty() {
        safe = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(FALLBACK_NAME_LEN)
            .map(char::from)
            .collect();
    }
    let ext: Option<String> =
        ext.map(|e| e.chars().filter(char::is_ascii_alphanumeric).collect());

    let mut name = format!("{}_{}_{}", Utc::now().timestamp(), Uuid::new_v4(), safe);
    if let Some(ext) = ext.filter(|e| !e.is_empty()) {
        name.push('.');
        name.push_str(&ext);
    }
    name
}
