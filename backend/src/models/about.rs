use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::AboutId;
use crate::validation::rules;

/// Content of the single "about" page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct About {
    pub id: AboutId,
    pub title: String,
    pub content: String,
    pub vision: Option<String>,
    pub mission: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl About {
    pub fn from_payload(payload: UpsertAboutRequest) -> Self {
        let now = Utc::now();
        Self {
            id: AboutId::new(),
            title: payload.title,
            content: payload.content,
            vision: payload.vision,
            mission: payload.mission,
            image_url: payload.image_url,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Replaces the page content while keeping identity and creation time.
    pub fn replace(&mut self, payload: UpsertAboutRequest) {
        self.title = payload.title;
        self.content = payload.content;
        self.vision = payload.vision;
        self.mission = payload.mission;
        self.image_url = payload.image_url;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertAboutRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: String,
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub content: String,
    pub vision: Option<String>,
    pub mission: Option<String>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> UpsertAboutRequest {
        UpsertAboutRequest {
            title: title.into(),
            content: "We serve the community.".into(),
            vision: Some("Vision".into()),
            mission: None,
            image_url: None,
        }
    }

    #[test]
    fn replace_keeps_identity() {
        let mut about = About::from_payload(payload("About us"));
        let id = about.id;
        let created_at = about.created_at;
        about.replace(payload("Who we are"));
        assert_eq!(about.id, id);
        assert_eq!(about.created_at, created_at);
        assert_eq!(about.title, "Who we are");
        assert!(about.updated_at >= created_at);
    }
}
