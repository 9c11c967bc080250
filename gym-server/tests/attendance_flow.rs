//! 到场签到集成测试
//!
//! 时长按完成的整分钟向下取整；重复签退覆盖前一次结果

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use surrealdb::RecordId;
use tempfile::TempDir;
use tower::ServiceExt;

use gym_server::core::build_router;
use gym_server::db::models::UserCreate;
use gym_server::db::repository::UserRepository;
use gym_server::{Config, ServerState};
use shared::types::{MembershipPlan, MembershipStatus, Role};
use shared::util::{DAY_MS, MINUTE_MS, now_millis};

async fn spawn_app() -> (Router, ServerState, TempDir) {
    let tmp = TempDir::new().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;
    (build_router(state.clone()), state, tmp)
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

async fn register_member(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "fullName": name, "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn seed_staff(state: &ServerState, email: &str, role: Role) -> String {
    let now = now_millis();
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(UserCreate {
            full_name: "Staff User".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            phone: None,
            date_of_birth: None,
            role,
            membership_plan: MembershipPlan::Vip,
            membership_status: MembershipStatus::Active,
            membership_expiry: now + 365 * DAY_MS,
            join_date: now,
        })
        .await
        .unwrap();
    state
        .get_jwt_service()
        .generate_token(&user.id_string(), user.role)
        .unwrap()
}

async fn check_in(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/attendance/checkin",
        Some(token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Rewind a visit's stored check-in time by `millis`
async fn backdate_check_in(state: &ServerState, attendance_id: &str, millis: i64) {
    let thing: RecordId = attendance_id.parse().unwrap();
    state
        .get_db()
        .query("UPDATE $thing SET checkInTime = $t")
        .bind(("thing", thing))
        .bind(("t", now_millis() - millis))
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[tokio::test]
async fn checkout_floors_duration_to_whole_minutes() {
    let (app, state, _tmp) = spawn_app().await;
    let token = register_member(&app, "Alice Cooper", "alice@example.com").await;

    let attendance_id = check_in(&app, &token).await;
    // 2 minutes 30 seconds on the clock
    backdate_check_in(&state, &attendance_id, 150 * 1000).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/attendance/{attendance_id}/checkout"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["durationMinutes"], 2);
    assert!(body["data"]["checkOutTime"].as_i64().is_some());
}

#[tokio::test]
async fn repeated_checkout_overwrites_the_previous_one() {
    let (app, state, _tmp) = spawn_app().await;
    let token = register_member(&app, "Bob Davis", "bob@example.com").await;

    let attendance_id = check_in(&app, &token).await;
    backdate_check_in(&state, &attendance_id, 2 * MINUTE_MS).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/attendance/{attendance_id}/checkout"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["durationMinutes"], 2);
    let first_checkout = body["data"]["checkOutTime"].as_i64().unwrap();

    // Check out again after rewinding further; the record is recomputed
    backdate_check_in(&state, &attendance_id, 6 * MINUTE_MS).await;
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/attendance/{attendance_id}/checkout"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["durationMinutes"], 6);
    assert!(body["data"]["checkOutTime"].as_i64().unwrap() >= first_checkout);
}

#[tokio::test]
async fn checkout_of_unknown_visit_is_not_found() {
    let (app, _state, _tmp) = spawn_app().await;
    let token = register_member(&app, "Carl Mato", "carl@example.com").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/attendance/attendance:doesnotexist/checkout",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_in_links_an_existing_class_or_fails() {
    let (app, _state, _tmp) = spawn_app().await;
    let token = register_member(&app, "Dara Beck", "dara@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance/checkin",
        Some(&token),
        Some(json!({ "classId": "class:doesnotexist" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Class not found");

    // With notes and no class, a plain gym visit is recorded
    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance/checkin",
        Some(&token),
        Some(json!({ "notes": "leg day" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["notes"], "leg day");
    assert!(body["data"].get("class").is_none() || body["data"]["class"].is_null());
}

#[tokio::test]
async fn visit_history_is_scoped_to_the_caller() {
    let (app, state, _tmp) = spawn_app().await;
    let first = register_member(&app, "Eve One", "eve@example.com").await;
    let second = register_member(&app, "Finn Two", "finn@example.com").await;

    check_in(&app, &first).await;

    let (status, body) = send(&app, "GET", "/api/attendance/my-attendance", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    let (status, body) = send(
        &app,
        "GET",
        "/api/attendance/my-attendance",
        Some(&second),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);

    // The full log is staff-only
    let (status, _) = send(&app, "GET", "/api/attendance/all", Some(&first), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let staff_token = seed_staff(&state, "coach@gym.com", Role::Trainer).await;
    let (status, body) = send(&app, "GET", "/api/attendance/all", Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}
