use std::sync::Arc;

use crate::{
    config::Config,
    db::connection::DbPool,
    middleware::RateLimiter,
    repositories::{AccountStore, PgAccountStore, PgSessionStore, SessionStore},
    services::{AuthService, KajianSyncService, UploadStore, VideoSource, YouTubeClient},
    utils::jwt::TokenCodec,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub kajian_sync: KajianSyncService,
    pub rate_limiter: Arc<RateLimiter>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        config: Config,
        auth: Arc<AuthService>,
        video_source: Arc<dyn VideoSource>,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        let uploads = UploadStore::from_config(&config.upload);
        Self {
            pool,
            config,
            auth,
            kajian_sync: KajianSyncService::new(video_source),
            rate_limiter,
            uploads,
        }
    }

    /// Production wiring: Postgres-backed stores and the platform client.
    pub fn from_config(pool: DbPool, config: Config) -> anyhow::Result<Self> {
        let accounts: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool.clone()));
        let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
        let auth = Arc::new(AuthService::new(
            accounts,
            sessions,
            TokenCodec::from_config(&config)?,
        ));
        let video_source: Arc<dyn VideoSource> =
            Arc::new(YouTubeClient::new(config.youtube.clone())?);
        Ok(Self::new(pool, config, auth, video_source))
    }
}
