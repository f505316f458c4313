pub mod auth;
pub mod kajian;
pub mod upload;
pub mod video;

pub use auth::{AuthError, AuthService};
pub use kajian::{KajianSink, KajianSyncService, PgKajianSink};
pub use upload::{StoredFile, UploadError, UploadStore};
pub use video::{VideoSource, VideoSourceError, YouTubeClient};
