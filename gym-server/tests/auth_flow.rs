//! 认证流程集成测试
//!
//! 注册 / 登录 / 密码重置走完整 HTTP 栈，每个测试使用独立的临时数据库

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use gym_server::core::build_router;
use gym_server::{Config, ServerState};
use shared::util::DAY_MS;

async fn spawn_app() -> (Router, TempDir) {
    let tmp = TempDir::new().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;
    (build_router(state), tmp)
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "fullName": name, "email": email, "password": password })),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn register_grants_a_year_of_basic_membership() {
    let (app, _tmp) = spawn_app().await;

    let (status, body) = register(&app, "Alice Cooper", "alice@example.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert!(data["token"].as_str().is_some_and(|t| !t.is_empty()));

    let user = &data["user"];
    assert_eq!(user["role"], "member");
    assert_eq!(user["membershipPlan"], "Basic");
    assert_eq!(user["membershipStatus"], "Active");

    let join_date = user["joinDate"].as_i64().unwrap();
    let expiry = user["membershipExpiry"].as_i64().unwrap();
    assert_eq!(expiry - join_date, 365 * DAY_MS);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (app, _tmp) = spawn_app().await;

    let (status, _) = register(&app, "Alice Cooper", "alice@example.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "Another Alice", "alice@example.com", "other456").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn login_with_wrong_password_returns_no_token() {
    let (app, _tmp) = spawn_app().await;
    register(&app, "Bob Davis", "bob@example.com", "secret123").await;

    let (status, body) = login(&app, "bob@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body.get("data").is_none());

    // Unknown accounts get the same answer, no enumeration
    let (status, body) = login(&app, "nobody@example.com", "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (app, _tmp) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized to access this route");
}

#[tokio::test]
async fn me_returns_the_database_record() {
    let (app, _tmp) = spawn_app().await;

    let (_, body) = register(&app, "Carla Reyes", "carla@example.com", "secret123").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "carla@example.com");
    assert_eq!(body["data"]["fullName"], "Carla Reyes");
    // Secrets never serialize
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn password_reset_token_is_single_use() {
    let (app, _tmp) = spawn_app().await;
    register(&app, "Dana Fox", "dana@example.com", "original1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "dana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset email sent");
    let reset_token = body["data"]["resetToken"].as_str().unwrap().to_string();

    // Consume the token
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/auth/reset-password/{reset_token}"),
        None,
        Some(json!({ "password": "renewed99" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some());

    // Old password is gone, new one works
    let (status, _) = login(&app, "dana@example.com", "original1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "dana@example.com", "renewed99").await;
    assert_eq!(status, StatusCode::OK);

    // Replaying the same token fails
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/auth/reset-password/{reset_token}"),
        None,
        Some(json!({ "password": "again1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn forgot_password_rejects_unknown_email() {
    let (app, _tmp) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No user with that email");
}

#[tokio::test]
async fn update_password_verifies_the_current_one() {
    let (app, _tmp) = spawn_app().await;

    let (_, body) = register(&app, "Evan Lim", "evan@example.com", "secret123").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(json!({ "currentPassword": "not-it", "newPassword": "changed456" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(json!({ "currentPassword": "secret123", "newPassword": "changed456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "evan@example.com", "changed456").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_validates_the_payload() {
    let (app, _tmp) = spawn_app().await;

    let (status, body) = register(&app, "Short Pass", "short@example.com", "tiny").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    let (status, _) = register(&app, "Bad Email", "not-an-email", "secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
