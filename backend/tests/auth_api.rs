use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sitecms_backend::{
    app,
    config::Config,
    models::user::AccountRole,
    types::AccountId,
    utils::jwt::{Claims, TOKEN_ISSUER},
};
use tower::ServiceExt;

mod support;

use support::{harness, register_request, test_config, test_state, Harness};

fn build_router(config: Config) -> (Router, Harness) {
    let h = harness(&config);
    let router = app(test_state(config, h.auth.clone()));
    (router, h)
}

fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("build request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn seed_and_login(router: &Router, h: &Harness, username: &str, admin: bool) -> Value {
    let mut request = register_request(username, &format!("{}@example.com", username), "secret1");
    if admin {
        request.role = Some("admin".into());
    }
    h.auth.register(request).await.expect("register");

    let (status, body) = send(
        router,
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "username": username, "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body
}

#[tokio::test]
async fn login_returns_tokens_and_hides_password_hash() {
    let (router, h) = build_router(test_config());
    let body = seed_and_login(&router, &h, "alice", false).await;

    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["account"]["username"], "alice");
    assert_eq!(body["account"]["role"], "member");
    assert!(body["account"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let (router, h) = build_router(test_config());
    seed_and_login(&router, &h, "bob", false).await;

    let (wrong_status, wrong_body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "username": "bob", "password": "nope" }),
            None,
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "username": "ghost", "password": "secret1" }),
            None,
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid username or password");
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let (router, h) = build_router(test_config());
    let login = seed_and_login(&router, &h, "carol", false).await;
    let refresh_token = login["refresh_token"].as_str().expect("refresh token");

    let (status, rotated) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refresh_token": refresh_token }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(rotated.get("account").is_none());
    assert_ne!(rotated["refresh_token"], login["refresh_token"]);

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refresh_token": refresh_token }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Refresh token expired or revoked");

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refresh_token": "never-issued" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid refresh token");
}

#[tokio::test]
async fn logout_then_refresh_fails() {
    let (router, h) = build_router(test_config());
    let login = seed_and_login(&router, &h, "dave", false).await;
    let refresh_token = login["refresh_token"].as_str().expect("refresh token");

    for _ in 0..2 {
        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/api/auth/logout",
                json!({ "refresh_token": refresh_token }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out");
    }

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refresh_token": refresh_token }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() {
    let (router, h) = build_router(test_config());
    let login = seed_and_login(&router, &h, "erin", false).await;
    let access = login["access_token"].as_str().expect("access token");

    let (status, body) = send(&router, get_request("/api/auth/me", Some(access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "erin");
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(&router, get_request("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");

    let (status, body) = send(&router, get_request("/api/auth/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn expired_access_token_is_reported_as_expired() {
    let config = test_config();
    let secret = config.jwt_secret.clone();
    let (router, _h) = build_router(config);

    let issued_at = Utc::now().timestamp() - 3_600;
    let claims = Claims {
        account_id: AccountId::new(),
        username: "frank".into(),
        role: AccountRole::Member,
        iss: TOKEN_ISSUER.into(),
        sub: "frank".into(),
        iat: issued_at,
        nbf: issued_at,
        exp: issued_at + 60,
        jti: "expired".into(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token");

    let (status, body) = send(&router, get_request("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn logout_all_reports_revoked_sessions() {
    let (router, h) = build_router(test_config());
    let first = seed_and_login(&router, &h, "grace", false).await;
    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "username": "grace", "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = first["access_token"].as_str().expect("access token");
    let (status, body) = send(
        &router,
        json_request("POST", "/api/auth/logout-all", json!({}), Some(access)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], 2);
}

#[tokio::test]
async fn register_is_admin_only() {
    let (router, h) = build_router(test_config());
    let member = seed_and_login(&router, &h, "member1", false).await;
    let admin = seed_and_login(&router, &h, "admin1", true).await;
    let payload = json!({
        "username": "newbie",
        "email": "newbie@example.com",
        "password": "secret1",
        "name": "New Member"
    });

    let (status, _) = send(
        &router,
        json_request("POST", "/api/auth/register", payload.clone(), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/register",
            payload.clone(),
            member["access_token"].as_str(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/register",
            payload.clone(),
            admin["access_token"].as_str(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["username"], "newbie");
    assert!(body["account"].get("password_hash").is_none());

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/register",
            payload,
            admin["access_token"].as_str(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn register_validates_payload() {
    let (router, h) = build_router(test_config());
    let admin = seed_and_login(&router, &h, "admin2", true).await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/register",
            json!({ "username": "x", "email": "not-an-email", "password": "123" }),
            admin["access_token"].as_str(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn rate_limiter_rejects_bursts_per_client() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests = 2;
    config.trust_proxy_headers = true;
    let (router, _h) = build_router(config);

    let from = |ip: &str| {
        Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .expect("build request")
    };

    for _ in 0..2 {
        let (status, _) = send(&router, from("198.51.100.1")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let response = router
        .clone()
        .oneshot(from("198.51.100.1"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    let (status, _) = send(&router, from("198.51.100.2")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn spoofed_forwarded_for_is_ignored_without_a_trusted_proxy() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests = 2;
    let (router, _h) = build_router(config);

    let from = |ip: &str| {
        Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .expect("build request")
    };

    for ip in ["198.51.100.1", "198.51.100.2"] {
        let (status, _) = send(&router, from(ip)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = send(&router, from("198.51.100.3")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (router, _h) = build_router(test_config());

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .expect("build request");
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-123")
    );

    let response = router
        .oneshot(get_request("/api/auth/me", None))
        .await
        .expect("response");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn content_writes_require_an_admin() {
    let (router, h) = build_router(test_config());
    let member = seed_and_login(&router, &h, "member2", false).await;
    let banner = json!({ "title": "Ramadan", "media_url": "/uploads/ramadan.png" });

    for (method, uri) in [
        ("POST", "/api/banners"),
        ("PUT", "/api/about"),
        ("POST", "/api/kajian/sync"),
        ("GET", "/api/donations"),
        ("GET", "/api/admin/announcements"),
    ] {
        let (status, _) = send(&router, json_request(method, uri, banner.clone(), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let (status, _) = send(
            &router,
            json_request(method, uri, banner.clone(), member["access_token"].as_str()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}
