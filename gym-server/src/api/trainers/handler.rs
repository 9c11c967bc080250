//! Trainer API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::response::{ApiResponse, ListResponse};
use shared::types::Role;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{TrainerProfileUpdate, User};
use crate::db::repository::UserRepository;
use crate::utils::{AppResult, ok};

/// List all trainers (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<ListResponse<User>>>> {
    let repo = UserRepository::new(state.get_db());
    let trainers = repo.find_trainers().await?;
    Ok(ok(ListResponse::from(trainers)))
}

/// Get trainer by id (public)
///
/// A user id that resolves to a non-trainer account is reported as absent.
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let trainer = repo.find_by_id(&id).await?;

    match trainer {
        Some(user) if user.role == Role::Trainer => Ok(ok(user)),
        _ => Err(AppError::not_found("Trainer not found")),
    }
}

/// Update trainer profile fields (trainer self or admin)
pub async fn update_profile(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<TrainerProfileUpdate>,
) -> AppResult<Json<ApiResponse<User>>> {
    if current.id != id && !current.is_admin() {
        return Err(AppError::forbidden("Not authorized to update this profile"));
    }

    let repo = UserRepository::new(state.get_db());
    match repo.find_by_id(&id).await? {
        Some(user) if user.role == Role::Trainer => {}
        _ => return Err(AppError::not_found("Trainer not found")),
    }

    let trainer = repo.update_trainer_profile(&id, payload).await?;
    Ok(ok(trainer))
}
