use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::EventId;
use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn new(payload: CreateEventRequest) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::new(),
            title: payload.title,
            description: payload.description,
            date: payload.date,
            location: payload.location,
            image_url: payload.image_url,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, payload: UpdateEventRequest) {
        if let Some(title) = payload.title {
            self.title = title;
        }
        if let Some(description) = payload.description {
            self.description = Some(description);
        }
        if let Some(date) = payload.date {
            self.date = date;
        }
        if let Some(location) = payload.location {
            self.location = Some(location);
        }
        if let Some(image_url) = payload.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}
