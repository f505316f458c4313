use axum::{
    extract::{ConnectInfo, Extension, FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::client_ip,
    models::{
        session::ClientMeta,
        user::{
            AccountResponse, LoginRequest, LoginResponse, RefreshTokenRequest,
            RefreshTokenResponse, RegisterRequest,
        },
    },
    state::AppState,
    utils::jwt::Claims,
};

const MAX_USER_AGENT_LEN: usize = 512;

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.chars().take(MAX_USER_AGENT_LEN).collect::<String>())
            .filter(|v| !v.is_empty());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientMeta {
            user_agent,
            ip_address: Some(client_ip(
                &parts.headers,
                peer,
                state.config.trust_proxy_headers,
            )),
        })
    }
}

pub async fn login(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    let response = state.auth.login(payload, client).await?;
    Ok(Json(response))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, AppError> {
    payload.validate()?;
    let response = state.auth.refresh_token(&payload.refresh_token).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;
    state.auth.logout(&payload.refresh_token).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, AppError> {
    let revoked = state.auth.logout_all(claims.account_id).await?;
    Ok(Json(json!({
        "message": "Logged out from all sessions",
        "revoked": revoked,
    })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.auth.get_current_account(claims.account_id).await?;
    Ok(Json(account.into()))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload.validate()?;
    let account = state.auth.register(payload).await?;
    tracing::info!(
        created_by = %claims.account_id,
        account_id = %account.id,
        "account created by admin"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "account": AccountResponse::from(account) })),
    ))
}
