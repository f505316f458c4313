use sitecms_backend::{
    config::Config,
    db::connection::create_pool,
    repositories::{PgSessionStore, SessionStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_cleanup=info,sitecms_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let deleted = PgSessionStore::new(pool.clone()).delete_expired().await?;
    if deleted > 0 {
        tracing::info!("Deleted {} expired sessions", deleted);
    }

    sqlx::query("VACUUM (ANALYZE) sessions")
        .execute(&pool)
        .await?;

    Ok(())
}
