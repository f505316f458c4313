pub mod about;
pub mod announcements;
pub mod auth;
pub mod banners;
pub mod donation_categories;
pub mod donations;
pub mod events;
pub mod gallery;
pub mod kajian;
pub mod upload;
