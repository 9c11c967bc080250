//! 课程报名集成测试
//!
//! 重点验证容量上限在并发报名下不被突破，以及重复报名 / 退课语义

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use gym_server::core::build_router;
use gym_server::db::models::UserCreate;
use gym_server::db::repository::UserRepository;
use gym_server::{Config, ServerState, expiry_from};
use shared::types::{MembershipPlan, MembershipStatus, Role};
use shared::util::now_millis;

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

/// Seed a user straight through the repository and mint a token for it
async fn seed_user(state: &ServerState, name: &str, email: &str, role: Role) -> (String, String) {
    let now = now_millis();
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(UserCreate {
            full_name: name.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            phone: None,
            date_of_birth: None,
            role,
            membership_plan: MembershipPlan::Basic,
            membership_status: MembershipStatus::Active,
            membership_expiry: expiry_from(now, 365),
            join_date: now,
        })
        .await
        .unwrap();

    let token = state
        .get_jwt_service()
        .generate_token(&user.id_string(), user.role)
        .unwrap();
    (user.id_string(), token)
}

/// Register a member over HTTP and return its token
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

/// Create a class as admin and return its id
async fn create_class(app: &Router, admin_token: &str, trainer_id: &str, capacity: u32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/classes",
        Some(admin_token),
        Some(json!({
            "name": "Capacity Trial",
            "trainer": trainer_id,
            "schedule": { "dayOfWeek": "Monday", "startTime": "06:00", "endTime": "07:00" },
            "capacity": capacity,
            "durationMinutes": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "class create failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn enroll(app: &Router, class_id: &str, token: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/classes/{class_id}/enroll"),
        Some(token),
        None,
    )
    .await
}

#[tokio::test]
async fn two_racers_cannot_share_the_last_seat() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, admin_token) = seed_user(&state, "Admin User", "admin@gym.com", Role::Admin).await;
    let (trainer_id, _) = seed_user(&state, "John Smith", "john@gym.com", Role::Trainer).await;
    let class_id = create_class(&app, &admin_token, &trainer_id, 1).await;

    let first = register_member(&app, "Racer One", "racer1@example.com").await;
    let second = register_member(&app, "Racer Two", "racer2@example.com").await;

    let (a, b) = tokio::join!(
        enroll(&app, &class_id, &first),
        enroll(&app, &class_id, &second)
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let loser = if a.0 == StatusCode::CONFLICT { a.1 } else { b.1 };
    assert_eq!(loser["message"], "Class is full");
}

#[tokio::test]
async fn capacity_three_admits_exactly_three_of_eight() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, admin_token) = seed_user(&state, "Admin User", "admin@gym.com", Role::Admin).await;
    let (trainer_id, _) = seed_user(&state, "John Smith", "john@gym.com", Role::Trainer).await;
    let class_id = create_class(&app, &admin_token, &trainer_id, 3).await;

    let mut tokens = Vec::new();
    for i in 0..8 {
        let email = format!("crowd{i}@example.com");
        tokens.push(register_member(&app, &format!("Crowd {i}"), &email).await);
    }

    let mut handles = Vec::new();
    for token in tokens {
        let app = app.clone();
        let class_id = class_id.clone();
        handles.push(tokio::spawn(async move {
            enroll(&app, &class_id, &token).await.0
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => admitted += 1,
            StatusCode::CONFLICT => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(admitted, 3);
    assert_eq!(rejected, 5);

    // The stored roster agrees with the admitted count
    let (status, body) = send(&app, "GET", &format!("/api/classes/{class_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["availableSpots"], 0);
}

#[tokio::test]
async fn enrolling_twice_is_a_conflict() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, admin_token) = seed_user(&state, "Admin User", "admin@gym.com", Role::Admin).await;
    let (trainer_id, _) = seed_user(&state, "John Smith", "john@gym.com", Role::Trainer).await;
    let class_id = create_class(&app, &admin_token, &trainer_id, 10).await;

    let token = register_member(&app, "Alice Cooper", "alice@example.com").await;

    let (status, _) = enroll(&app, &class_id, &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = enroll(&app, &class_id, &token).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Already enrolled in this class");
}

#[tokio::test]
async fn unenroll_is_idempotent() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, admin_token) = seed_user(&state, "Admin User", "admin@gym.com", Role::Admin).await;
    let (trainer_id, _) = seed_user(&state, "John Smith", "john@gym.com", Role::Trainer).await;
    let class_id = create_class(&app, &admin_token, &trainer_id, 10).await;

    let token = register_member(&app, "Alice Cooper", "alice@example.com").await;

    // Never enrolled, still succeeds
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{class_id}/unenroll"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"].as_array().unwrap().len(), 0);

    // Enroll then leave, seat is freed
    enroll(&app, &class_id, &token).await;
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{class_id}/unenroll"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn members_cannot_create_classes() {
    let (app, state, _tmp) = spawn_app().await;
    let (trainer_id, _) = seed_user(&state, "John Smith", "john@gym.com", Role::Trainer).await;
    let token = register_member(&app, "Alice Cooper", "alice@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&token),
        Some(json!({
            "name": "Rogue Class",
            "trainer": trainer_id,
            "schedule": { "dayOfWeek": "Friday", "startTime": "10:00", "endTime": "11:00" },
            "capacity": 5,
            "durationMinutes": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "User role member is not authorized to access this route"
    );
}

#[tokio::test]
async fn class_list_is_public_but_enrollment_is_not() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, admin_token) = seed_user(&state, "Admin User", "admin@gym.com", Role::Admin).await;
    let (trainer_id, _) = seed_user(&state, "John Smith", "john@gym.com", Role::Trainer).await;
    let class_id = create_class(&app, &admin_token, &trainer_id, 5).await;

    let (status, body) = send(&app, "GET", "/api/classes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/classes/{class_id}/enroll"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
