use std::{env, sync::Arc};

use sitecms_backend::{
    config::Config,
    db::connection::create_pool,
    models::{donation::DonationCategory, user::RegisterRequest},
    repositories::{
        AccountStore, DonationCategoryRepository, PgAccountStore, PgSessionStore, Repository,
    },
    services::AuthService,
    utils::jwt::TokenCodec,
};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Pembangunan", "Donasi untuk pembangunan masjid"),
    ("Operasional", "Donasi untuk operasional masjid"),
    ("Sosial", "Donasi untuk kegiatan sosial"),
    ("Anak Yatim", "Donasi untuk program anak yatim"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,sitecms_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    if let Err(err) = seed_admin(&pool, &config).await {
        tracing::warn!(error = %err, "failed to seed default admin");
    }
    seed_donation_categories(&pool).await;

    tracing::info!("database seeding completed");
    Ok(())
}

async fn seed_admin(pool: &PgPool, config: &Config) -> anyhow::Result<()> {
    let username = env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    if accounts.exists_by_login(&username).await? {
        tracing::info!(username = %username, "default admin already exists, skipping");
        return Ok(());
    }

    let password = env::var("SEED_ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("SEED_ADMIN_PASSWORD must be set to seed the admin"))?;
    let request = RegisterRequest {
        username: username.clone(),
        email: env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@sitecms.local".into()),
        password,
        name: env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Default Admin".into()),
        role: Some("admin".into()),
    };

    let auth = AuthService::new(
        accounts,
        Arc::new(PgSessionStore::new(pool.clone())),
        TokenCodec::from_config(config)?,
    );
    let account = auth.register(request).await?;
    tracing::info!(account_id = %account.id, username = %account.username, "default admin created");
    Ok(())
}

async fn seed_donation_categories(pool: &PgPool) {
    let repo = DonationCategoryRepository::new();
    for (name, description) in DEFAULT_CATEGORIES {
        match repo.name_taken(pool, name, None).await {
            Ok(true) => {
                tracing::info!(category = name, "category already exists, skipping");
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(category = name, error = ?err, "failed to check category");
                continue;
            }
        }

        let category = DonationCategory::new(name.to_string(), Some(description.to_string()));
        match repo.create(pool, &category).await {
            Ok(_) => tracing::info!(category = name, "donation category seeded"),
            Err(err) => tracing::warn!(category = name, error = ?err, "failed to seed category"),
        }
    }
}
