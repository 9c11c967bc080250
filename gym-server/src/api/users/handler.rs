//! User API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::response::{ApiResponse, ListResponse};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserUpdate};
use crate::db::repository::{DeletionOutcome, MemberStats, UserRepository};
use crate::security_log;
use crate::utils::{AppResult, ok, ok_with_message};

/// List all users (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<ListResponse<User>>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_all().await?;
    Ok(ok(ListResponse::from(users)))
}

/// Member statistics (admin)
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<MemberStats>>> {
    let repo = UserRepository::new(state.get_db());
    let stats = repo.member_stats().await?;
    Ok(ok(stats))
}

/// Get user by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(user))
}

/// Update a user profile
///
/// Self-service for the profile fields; membership and role fields are
/// admin-only regardless of whose record it is.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<User>>> {
    if current.id != id && !current.is_admin() {
        security_log!(
            "WARN",
            "user_update_denied",
            user_id = current.id.clone(),
            target = id.clone()
        );
        return Err(AppError::forbidden("Not authorized to update this user"));
    }

    if !current.is_admin() && payload.touches_privileged_fields() {
        return Err(AppError::forbidden(
            "Not authorized to update membership details",
        ));
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo.update(&id, payload).await?;
    Ok(ok(user))
}

/// Delete a user (admin)
///
/// Follows the configured deletion policy: hard delete removes the record
/// and scrubs class rosters, anonymize keeps the financial history under a
/// scrubbed identity.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let anonymize = state.config.deletion_policy.is_anonymize();
    let repo = UserRepository::new(state.get_db());
    let outcome = repo.delete(&id, anonymize).await?;

    security_log!("INFO", "user_deleted", target = id.clone());

    let message = match outcome {
        DeletionOutcome::Deleted => "User deleted",
        DeletionOutcome::Anonymized => "User anonymized",
    };
    Ok(ok_with_message(true, message))
}
