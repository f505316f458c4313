use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{handlers, middleware, state::AppState};

/// Room for multipart boundaries and text fields on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the full application router for the given state.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/announcements",
            get(handlers::announcements::list_published),
        )
        .route(
            "/api/announcements/{id}",
            get(handlers::announcements::get_published),
        )
        .route("/api/banners", get(handlers::banners::list))
        .route("/api/banners/{id}", get(handlers::banners::get))
        .route("/api/events", get(handlers::events::list))
        .route("/api/events/{id}", get(handlers::events::get))
        .route("/api/gallery", get(handlers::gallery::list))
        .route("/api/gallery/{id}", get(handlers::gallery::get))
        .route(
            "/api/donation-categories",
            get(handlers::donation_categories::list),
        )
        .route(
            "/api/donation-categories/{id}",
            get(handlers::donation_categories::get),
        )
        .route("/api/donations/summary", get(handlers::donations::summary))
        .route("/api/about", get(handlers::about::get))
        .route("/api/kajian", get(handlers::kajian::list))
        .route("/api/kajian/{id}", get(handlers::kajian::get));

    // Any authenticated account
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout-all", post(handlers::auth::logout_all))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ));

    let admin_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/upload", post(handlers::upload::upload))
        .route(
            "/api/admin/announcements",
            get(handlers::announcements::list_all),
        )
        .route(
            "/api/announcements",
            post(handlers::announcements::create),
        )
        .route(
            "/api/announcements/{id}",
            put(handlers::announcements::update).delete(handlers::announcements::delete),
        )
        .route("/api/banners", post(handlers::banners::create))
        .route(
            "/api/banners/{id}",
            put(handlers::banners::update).delete(handlers::banners::delete),
        )
        .route("/api/events", post(handlers::events::create))
        .route(
            "/api/events/{id}",
            put(handlers::events::update).delete(handlers::events::delete),
        )
        .route("/api/gallery", post(handlers::gallery::create))
        .route(
            "/api/gallery/{id}",
            put(handlers::gallery::update).delete(handlers::gallery::delete),
        )
        .route(
            "/api/donation-categories",
            post(handlers::donation_categories::create),
        )
        .route(
            "/api/donation-categories/{id}",
            put(handlers::donation_categories::update)
                .delete(handlers::donation_categories::delete),
        )
        .route(
            "/api/donations",
            get(handlers::donations::list).post(handlers::donations::create),
        )
        .route(
            "/api/donations/{id}",
            get(handlers::donations::get)
                .put(handlers::donations::update)
                .delete(handlers::donations::delete),
        )
        .route("/api/about", put(handlers::about::upsert))
        .route("/api/kajian/sync", post(handlers::kajian::sync))
        .route(
            "/api/kajian/{id}",
            axum::routing::delete(handlers::kajian::delete),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_admin,
        ))
        .layer(DefaultBodyLimit::max(
            state.uploads.max_size().saturating_add(FORM_OVERHEAD_BYTES),
        ));

    let cors = cors_layer(&state.config.cors_allow_origins);
    let uploads = ServeDir::new(&state.config.upload.path);

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .nest_service("/uploads", uploads)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::log_error_responses))
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(24 * 60 * 60));

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}
