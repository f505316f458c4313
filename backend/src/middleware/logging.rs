use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::middleware::request_id::RequestId;

/// Server error bodies are JSON envelopes; anything bigger is not buffered.
const SERVER_ERROR_BODY_LIMIT: usize = 16 * 1024;
const PREVIEW_CHARS: usize = 512;

/// Logs every 4xx/5xx response. Client errors get a warning line; server
/// errors also carry the start of the body, which is re-attached afterwards.
pub async fn log_error_responses(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let started = Instant::now();

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    if response.status().is_client_error() {
        tracing::warn!(
            status,
            %method,
            path = %path,
            request_id = %request_id,
            latency_ms,
            "client error"
        );
        return response;
    }
    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    match to_bytes(body, SERVER_ERROR_BODY_LIMIT).await {
        Ok(bytes) => {
            tracing::error!(
                status,
                %method,
                path = %path,
                request_id = %request_id,
                latency_ms,
                body = %preview(&bytes),
                "server error"
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            tracing::error!(
                status,
                %method,
                path = %path,
                request_id = %request_id,
                latency_ms,
                error = %err,
                "server error with unreadable body"
            );
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::empty())
        }
    }
}

fn preview(bytes: &Bytes) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
