//! Workout API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::response::{ApiResponse, ListResponse};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Workout, WorkoutCreate, WorkoutUpdate, WorkoutWithTrainer};
use crate::db::repository::{UserRepository, WorkoutRepository, parse_record_id};
use crate::utils::{AppResult, ok};

/// Own workout plans with trainer names
pub async fn my_workouts(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<ListResponse<WorkoutWithTrainer>>>> {
    let member = parse_record_id(&current.id, "user")?;

    let repo = WorkoutRepository::new(state.get_db());
    let workouts = repo.find_by_user(member).await?;
    Ok(ok(ListResponse::from(workouts)))
}

/// Create a workout plan (trainer or admin)
///
/// The plan is assigned to `userId` from the payload, defaulting to the
/// caller. Trainers are always recorded as the authoring trainer.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<WorkoutCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Workout>>)> {
    let user_id = payload.user_id.clone().unwrap_or_else(|| current.id.clone());

    let users = UserRepository::new(state.get_db());
    let target = users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let target = target
        .id
        .ok_or_else(|| AppError::internal("User record missing id"))?;

    let trainer = if current.is_trainer() {
        Some(parse_record_id(&current.id, "user")?)
    } else {
        match payload.trainer_id.as_deref() {
            Some(trainer_id) => Some(parse_record_id(trainer_id, "user")?),
            None => None,
        }
    };

    let repo = WorkoutRepository::new(state.get_db());
    let workout = repo.create(target, trainer, payload).await?;

    tracing::info!(
        workout_id = %workout.id_string(),
        user_id = %user_id,
        "Workout plan created"
    );

    Ok((StatusCode::CREATED, ok(workout)))
}

/// Update a workout plan
///
/// Allowed for the assigned member, the authoring trainer, and admins.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<WorkoutUpdate>,
) -> AppResult<Json<ApiResponse<Workout>>> {
    let repo = WorkoutRepository::new(state.get_db());
    let workout = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout not found"))?;

    let caller = parse_record_id(&current.id, "user")?;
    let is_owner = workout.user == caller;
    let is_author = workout.trainer.as_ref() == Some(&caller);
    if !is_owner && !is_author && !current.is_admin() {
        return Err(AppError::forbidden("Not authorized to update this workout"));
    }

    let workout = repo.update(&id, payload).await?;
    Ok(ok(workout))
}

/// Mark a workout as completed today (assigned member only)
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Workout>>> {
    let repo = WorkoutRepository::new(state.get_db());
    let workout = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout not found"))?;

    let caller = parse_record_id(&current.id, "user")?;
    if workout.user != caller {
        return Err(AppError::forbidden("Not authorized to update this workout"));
    }

    let workout = repo.complete(&id).await?;
    Ok(ok(workout))
}
