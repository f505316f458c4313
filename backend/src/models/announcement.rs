use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::AnnouncementId;
use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn new(payload: CreateAnnouncementRequest) -> Self {
        let now = Utc::now();
        let mut announcement = Self {
            id: AnnouncementId::new(),
            title: payload.title,
            content: payload.content,
            image_url: payload.image_url,
            is_published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        announcement.set_published(payload.is_published.unwrap_or(false), now);
        announcement
    }

    /// `published_at` is stamped on the first transition to published and
    /// kept afterwards, even if the announcement is later unpublished.
    pub fn set_published(&mut self, published: bool, now: DateTime<Utc>) {
        if published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.is_published = published;
    }

    pub fn apply(&mut self, payload: UpdateAnnouncementRequest) {
        let now = Utc::now();
        if let Some(title) = payload.title {
            self.title = title;
        }
        if let Some(content) = payload.content {
            self.content = content;
        }
        if let Some(image_url) = payload.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(published) = payload.is_published {
            self.set_published(published, now);
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: String,
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub content: String,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub content: Option<String>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}
