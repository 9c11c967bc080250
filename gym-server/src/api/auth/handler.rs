//! Authentication Handlers
//!
//! Handles registration, login, and the password reset/change flows

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::client::{
    AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, RegisterRequest,
    ResetPasswordRequest, UpdatePasswordRequest, UserInfo,
};
use shared::response::ApiResponse;
use shared::types::{MembershipPlan, MembershipStatus, Role};
use shared::util::{MINUTE_MS, now_millis};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate};
use crate::db::repository::UserRepository;
use crate::membership::expiry_from;
use crate::security_log;
use crate::utils::{AppResult, ok, ok_with_message, validate_payload};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Register handler
///
/// Creates a member account with an Active membership that expires
/// `membership_duration_days` from now, then returns a fresh token.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    validate_payload(&payload)?;

    let now = now_millis();
    let expiry = expiry_from(now, state.config.membership_duration_days);

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(UserCreate {
            full_name: payload.full_name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            date_of_birth: payload.date_of_birth,
            role: Role::Member,
            membership_plan: MembershipPlan::Basic,
            membership_status: MembershipStatus::Active,
            membership_expiry: expiry,
            join_date: now,
        })
        .await?;

    let token = issue_token(&state, &user)?;

    tracing::info!(
        user_id = %user.id_string(),
        email = %user.email,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        ok(AuthResponse {
            token,
            user: UserInfo::from(&user),
        }),
    ))
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    validate_payload(&payload)?;

    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_email(&payload.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Check authentication result - unified error message to prevent account enumeration
    let Some(user) = user else {
        security_log!("WARN", "login_failed", email = payload.email.clone());
        return Err(AppError::invalid_credentials());
    };

    let password_valid = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        security_log!("WARN", "login_failed", user_id = user.id_string());
        return Err(AppError::invalid_credentials());
    }

    let token = issue_token(&state, &user)?;

    tracing::info!(
        user_id = %user.id_string(),
        role = %user.role,
        "User logged in successfully"
    );

    Ok(ok(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Get current user info
///
/// Returns the fresh database record, not the token claims
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(ok(user))
}

/// Forgot password handler
///
/// Issues a single-use reset token. There is no mail delivery; the raw token
/// is returned in the response body for the caller to forward.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<ForgotPasswordResponse>>> {
    validate_payload(&payload)?;

    let ttl_ms = state.config.reset_token_ttl_minutes * MINUTE_MS;
    let repo = UserRepository::new(state.get_db());
    let reset_token = repo.issue_reset_token(&payload.email, ttl_ms).await?;

    security_log!("INFO", "reset_token_issued", email = payload.email.clone());

    Ok(ok_with_message(
        ForgotPasswordResponse { reset_token },
        "Password reset email sent",
    ))
}

/// Reset password handler
///
/// Consumes the raw token from the URL path; invalid or expired tokens are
/// rejected with a single unified message.
pub async fn reset_password(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    validate_payload(&payload)?;

    let repo = UserRepository::new(state.get_db());
    let user = repo.consume_reset_token(&token, &payload.password).await?;

    let token = issue_token(&state, &user)?;

    security_log!("INFO", "password_reset", user_id = user.id_string());

    Ok(ok(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Update password handler (authenticated)
pub async fn update_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    validate_payload(&payload)?;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    let password_valid = user
        .verify_password(&payload.current_password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        security_log!("WARN", "password_change_denied", user_id = current.id.clone());
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    repo.set_password(&current.id, &payload.new_password).await?;

    let token = issue_token(&state, &user)?;

    security_log!("INFO", "password_changed", user_id = current.id.clone());

    Ok(ok(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

fn issue_token(state: &ServerState, user: &User) -> Result<String, AppError> {
    state
        .get_jwt_service()
        .generate_token(&user.id_string(), user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
}
