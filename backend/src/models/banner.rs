use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

use crate::types::BannerId;
use crate::validation::rules;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum BannerType {
    #[default]
    Image,
    Video,
}

impl FromStr for BannerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(BannerType::Image),
            "video" => Ok(BannerType::Video),
            other => Err(format!("unknown banner type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub banner_type: BannerType,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Banner {
    pub fn new(payload: CreateBannerRequest) -> Self {
        let now = Utc::now();
        Self {
            id: BannerId::new(),
            title: payload.title,
            description: payload.description,
            media_url: payload.media_url,
            banner_type: payload.banner_type.unwrap_or_default(),
            link_url: payload.link_url,
            is_active: payload.is_active.unwrap_or(true),
            sort_order: payload.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, payload: UpdateBannerRequest) {
        if let Some(title) = payload.title {
            self.title = title;
        }
        if let Some(description) = payload.description {
            self.description = Some(description);
        }
        if let Some(media_url) = payload.media_url {
            self.media_url = media_url;
        }
        if let Some(banner_type) = payload.banner_type {
            self.banner_type = banner_type;
        }
        if let Some(link_url) = payload.link_url {
            self.link_url = Some(link_url);
        }
        if let Some(is_active) = payload.is_active {
            self.is_active = is_active;
        }
        if let Some(sort_order) = payload.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBannerRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub media_url: String,
    #[serde(rename = "type")]
    pub banner_type: Option<BannerType>,
    #[validate(length(max = 500))]
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBannerRequest {
    #[validate(length(min = 1, max = 255), custom(function = "rules::validate_not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub media_url: Option<String>,
    #[serde(rename = "type")]
    pub banner_type: Option<BannerType>,
    #[validate(length(max = 500))]
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_type_rejects_unknown_values() {
        let parsed: Result<CreateBannerRequest, _> = serde_json::from_str(
            r#"{"title":"Hero","media_url":"/uploads/a.png","type":"gif"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn new_banner_defaults_to_active_image() {
        let payload: CreateBannerRequest =
            serde_json::from_str(r#"{"title":"Hero","media_url":"/uploads/a.png"}"#)
                .expect("payload");
        let banner = Banner::new(payload);
        assert_eq!(banner.banner_type, BannerType::Image);
        assert!(banner.is_active);
        assert_eq!(banner.sort_order, 0);
    }

    #[test]
    fn banner_type_parses_form_values() {
        assert_eq!("Video".parse::<BannerType>(), Ok(BannerType::Video));
        assert_eq!(" image ".parse::<BannerType>(), Ok(BannerType::Image));
        assert!("gif".parse::<BannerType>().is_err());
    }

    #[test]
    fn update_switches_type() {
        let payload: CreateBannerRequest =
            serde_json::from_str(r#"{"title":"Hero","media_url":"/uploads/a.png"}"#)
                .expect("payload");
        let mut banner = Banner::new(payload);
        banner.apply(UpdateBannerRequest {
            banner_type: Some(BannerType::Video),
            ..Default::default()
        });
        assert_eq!(banner.banner_type, BannerType::Video);
        assert_eq!(banner.title, "Hero");
    }
}
