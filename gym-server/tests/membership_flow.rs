//! 会籍生命周期集成测试
//!
//! 过期判定在访问受限接口时惰性落库；Completed 支付作为续费入口

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
use gym_server::{Config, ServerState};
use shared::types::{MembershipPlan, MembershipStatus, Role};
use shared::util::{DAY_MS, now_millis};

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

/// Seed a user whose membership expired yesterday but is still stored Active
async fn seed_stale_member(state: &ServerState, email: &str, role: Role) -> (String, String) {
    let now = now_millis();
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(UserCreate {
            full_name: "Stale Member".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            phone: None,
            date_of_birth: None,
            role,
            membership_plan: MembershipPlan::Basic,
            membership_status: MembershipStatus::Active,
            membership_expiry: now - DAY_MS,
            join_date: now - 366 * DAY_MS,
        })
        .await
        .unwrap();

    let token = state
        .get_jwt_service()
        .generate_token(&user.id_string(), user.role)
        .unwrap();
    (user.id_string(), token)
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

async fn check_in(app: &Router, token: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/attendance/checkin",
        Some(token),
        Some(json!({})),
    )
    .await
}

#[tokio::test]
async fn stale_active_member_is_gated_and_flipped_to_expired() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, token) = seed_stale_member(&state, "stale@example.com", Role::Member).await;

    // First gated request detects the lapse
    let (status, body) = check_in(&app, &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Your membership has expired. Please renew to continue."
    );

    // The flip is persisted, not just computed per request
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_email("stale@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.membership_status, MembershipStatus::Expired);

    // Subsequent requests see the stored Expired status
    let (status, body) = check_in(&app, &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Your membership is not active. Please renew to access this feature."
    );
}

#[tokio::test]
async fn staff_accounts_bypass_the_membership_gate() {
    let (app, state, _tmp) = spawn_app().await;
    // Expired on paper, but trainers and admins are not members
    let (_, trainer_token) = seed_stale_member(&state, "coach@gym.com", Role::Trainer).await;

    let (status, _) = check_in(&app, &trainer_token).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn completed_payment_renews_plan_status_and_expiry() {
    let (app, state, _tmp) = spawn_app().await;
    let (_, token) = seed_stale_member(&state, "lapsed@example.com", Role::Member).await;

    // Locked out first
    let (status, _) = check_in(&app, &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Pay for a Premium plan; status defaults to Completed
    let before = now_millis();
    let (status, body) = send(
        &app,
        "POST",
        "/api/payments",
        Some(&token),
        Some(json!({ "amount": 49.99, "plan": "Premium" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "payment failed: {body}");
    assert_eq!(body["data"]["status"], "Completed");
    assert!(body["data"]["invoiceNumber"].as_str().is_some());

    // Membership is renewed from now, not stacked on the lapsed expiry
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_email("lapsed@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.membership_plan, MembershipPlan::Premium);
    assert_eq!(user.membership_status, MembershipStatus::Active);
    assert!(user.membership_expiry >= before + 365 * DAY_MS);

    // And the gate opens again
    let (status, _) = check_in(&app, &token).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn pending_payment_does_not_renew() {
    let (app, state, _tmp) = spawn_app().await;
    let token = register_member(&app, "Fresh Member", "fresh@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/payments",
        Some(&token),
        Some(json!({ "amount": 79.99, "plan": "VIP", "status": "Pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_email("fresh@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.membership_plan, MembershipPlan::Basic);
}

#[tokio::test]
async fn payment_history_is_private_but_stats_are_admin_only() {
    let (app, state, _tmp) = spawn_app().await;
    let token = register_member(&app, "Payer", "payer@example.com").await;
    send(
        &app,
        "POST",
        "/api/payments",
        Some(&token),
        Some(json!({ "amount": 29.99, "plan": "Basic" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/payments/my-payments", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    // Members cannot read the gym-wide ledgers
    let (status, _) = send(&app, "GET", "/api/payments/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/api/payments/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin sees revenue including the fresh payment
    let admin_repo = UserRepository::new(state.get_db());
    let now = now_millis();
    let admin = admin_repo
        .create(UserCreate {
            full_name: "Admin User".to_string(),
            email: "admin@gym.com".to_string(),
            password: "admin123".to_string(),
            phone: None,
            date_of_birth: None,
            role: Role::Admin,
            membership_plan: MembershipPlan::Vip,
            membership_status: MembershipStatus::Active,
            membership_expiry: now + 365 * DAY_MS,
            join_date: now,
        })
        .await
        .unwrap();
    let admin_token = state
        .get_jwt_service()
        .generate_token(&admin.id_string(), Role::Admin)
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/payments/stats", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRevenue"], 29.99);
    assert_eq!(body["data"]["paymentCount"], 1);
}
