//! Class API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use surrealdb::RecordId;

use shared::response::{ApiResponse, ListResponse};
use shared::types::Role;

use crate::AppError;
use crate::auth::{ActiveMember, CurrentUser};
use crate::core::ServerState;
use crate::db::models::{Class, ClassCreate, ClassUpdate, ClassWithTrainer, RosterEntry};
use crate::db::repository::{ClassRepository, EnrollOutcome, UserRepository, parse_record_id};
use crate::utils::{AppResult, ok, ok_with_message};

/// Class detail: trainer name plus the expanded roster
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    #[serde(flatten)]
    pub class: ClassWithTrainer,
    /// capacity − enrolled, recomputed on every read
    pub available_spots: u32,
    pub roster: Vec<RosterEntry>,
}

/// List all classes with trainer names (public)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<ListResponse<ClassWithTrainer>>>> {
    let repo = ClassRepository::new(state.get_db());
    let classes = repo.find_all().await?;
    Ok(ok(ListResponse::from(classes)))
}

/// Get class by id with the enrolled roster expanded (public)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ClassDetail>>> {
    let repo = ClassRepository::new(state.get_db());
    let class = repo
        .find_by_id_with_trainer(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Class not found"))?;

    let roster = repo.roster(&class.class.enrolled).await?;
    let available_spots = class.class.available_spots();

    Ok(ok(ClassDetail {
        class,
        available_spots,
        roster,
    }))
}

/// Create a class (admin or trainer)
///
/// Trainers always own the classes they create; admins must name the
/// owning trainer in the payload.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ClassCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Class>>)> {
    let trainer_id = if current.is_trainer() {
        current.id.clone()
    } else {
        payload
            .trainer
            .clone()
            .ok_or_else(|| AppError::invalid("Trainer is required"))?
    };
    let trainer = resolve_trainer(&state, &trainer_id).await?;

    let repo = ClassRepository::new(state.get_db());
    let class = repo.create(payload, trainer).await?;

    tracing::info!(
        class_id = %class.id_string(),
        trainer_id = %trainer_id,
        "Class created"
    );

    Ok((StatusCode::CREATED, ok(class)))
}

/// Update a class (admin or trainer)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ClassUpdate>,
) -> AppResult<Json<ApiResponse<Class>>> {
    let trainer = match payload.trainer.as_deref() {
        Some(trainer_id) => Some(resolve_trainer(&state, trainer_id).await?),
        None => None,
    };

    let repo = ClassRepository::new(state.get_db());
    let class = repo.update(&id, payload, trainer).await?;
    Ok(ok(class))
}

/// Delete a class (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = ClassRepository::new(state.get_db());
    let deleted = repo.delete(&id).await?;
    Ok(ok_with_message(deleted, "Class deleted"))
}

/// Enroll the calling member (active membership required)
///
/// The roster append is a single conditional update, so two concurrent
/// calls against the last seat cannot both succeed.
pub async fn enroll(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ActiveMember(current): ActiveMember,
) -> AppResult<Json<ApiResponse<Class>>> {
    let member = parse_record_id(&current.id, "user")?;

    let repo = ClassRepository::new(state.get_db());
    match repo.enroll(&id, &member).await? {
        EnrollOutcome::Enrolled(class) => {
            tracing::info!(
                user_id = %current.id,
                class_id = %id,
                "Member enrolled in class"
            );
            Ok(ok(class))
        }
        EnrollOutcome::AlreadyEnrolled => {
            Err(AppError::conflict("Already enrolled in this class"))
        }
        EnrollOutcome::Full => Err(AppError::conflict("Class is full")),
    }
}

/// Unenroll the calling member (idempotent)
pub async fn unenroll(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Class>>> {
    let member = parse_record_id(&current.id, "user")?;

    let repo = ClassRepository::new(state.get_db());
    let class = repo.unenroll(&id, &member).await?;

    tracing::info!(
        user_id = %current.id,
        class_id = %id,
        "Member unenrolled from class"
    );

    Ok(ok(class))
}

/// Resolve a "user:key" string to an existing trainer's record id
async fn resolve_trainer(state: &ServerState, id: &str) -> Result<RecordId, AppError> {
    let repo = UserRepository::new(state.get_db());
    match repo.find_by_id(id).await? {
        Some(user) if user.role == Role::Trainer => user
            .id
            .ok_or_else(|| AppError::internal("Trainer record missing id")),
        _ => Err(AppError::not_found("Trainer not found")),
    }
}
