use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::GalleryId;
use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GalleryItem {
    pub id: GalleryId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GalleryItem {
    pub fn new(payload: CreateGalleryRequest) -> Self {
        let now = Utc::now();
        Self {
            id: GalleryId::new(),
            title: payload.title,
            description: payload.description,
            image_url: payload.image_url,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, payload: UpdateGalleryRequest) {
        if let Some(title) = payload.title {
            self.title = title;
        }
        if let Some(description) = payload.description {
            self.description = Some(description);
        }
        if let Some(image_url) = payload.image_url {
            self.image_url = image_url;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGalleryRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGalleryRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_url_fails_validation() {
        let payload = CreateGalleryRequest {
            title: "Iftar".into(),
            description: None,
            image_url: String::new(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image_url"));
    }

    #[test]
    fn deleted_at_is_never_serialized() {
        let item = GalleryItem::new(CreateGalleryRequest {
            title: "Iftar".into(),
            description: None,
            image_url: "/uploads/iftar.jpg".into(),
        });
        let json = serde_json::to_value(&item).expect("serialize");
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["image_url"], "/uploads/iftar.jpg");
    }
}
