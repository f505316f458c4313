use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    state::AppState,
    utils::jwt::{Claims, TokenError},
};

pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate_request(request.headers(), &state)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

// Auth + require admin role for admin-only routes
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate_request(request.headers(), &state)?;
    if !claims.is_admin() {
        tracing::warn!(account_id = %claims.account_id, "admin route denied");
        return Err(AppError::Forbidden("Admin access required".into()));
    }
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate_request(headers: &HeaderMap, state: &AppState) -> Result<Claims, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;

    state
        .auth
        .tokens()
        .verify_access(token)
        .map_err(|err| match err {
            TokenError::Expired => AppError::Unauthorized("Token expired".into()),
            _ => AppError::Unauthorized("Invalid token".into()),
        })
}
