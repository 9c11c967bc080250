//! Attendance API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::response::{ApiResponse, ListResponse};

use crate::AppError;
use crate::auth::{ActiveMember, CurrentUser};
use crate::core::ServerState;
use crate::db::models::{Attendance, AttendanceDetail, AttendanceWithClass, CheckInRequest};
use crate::db::repository::{AttendanceRepository, ClassRepository, parse_record_id};
use crate::utils::{AppResult, ok};

/// Check in the calling member (active membership required)
///
/// The class reference is optional; a plain gym visit has none.
pub async fn check_in(
    State(state): State<ServerState>,
    ActiveMember(current): ActiveMember,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Attendance>>)> {
    let member = parse_record_id(&current.id, "user")?;

    let class = match payload.class_id.as_deref() {
        Some(class_id) => {
            let classes = ClassRepository::new(state.get_db());
            let class = classes
                .find_by_id(class_id)
                .await?
                .ok_or_else(|| AppError::not_found("Class not found"))?;
            class.id
        }
        None => None,
    };

    let repo = AttendanceRepository::new(state.get_db());
    let attendance = repo.check_in(member, class, payload.notes).await?;

    tracing::info!(
        user_id = %current.id,
        attendance_id = %attendance.id_string(),
        "Member checked in"
    );

    Ok((StatusCode::CREATED, ok(attendance)))
}

/// Check out an open visit
///
/// Recomputes the duration from the stored check-in; a repeated checkout
/// overwrites the previous one.
pub async fn check_out(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let repo = AttendanceRepository::new(state.get_db());
    let attendance = repo.check_out(&id).await?;
    Ok(ok(attendance))
}

/// Own attendance history, most recent first
pub async fn my_attendance(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<ListResponse<AttendanceWithClass>>>> {
    let member = parse_record_id(&current.id, "user")?;

    let repo = AttendanceRepository::new(state.get_db());
    let records = repo.find_by_user(member).await?;
    Ok(ok(ListResponse::from(records)))
}

/// All attendance records with member and class names (admin or trainer)
pub async fn list_all(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<ListResponse<AttendanceDetail>>>> {
    let repo = AttendanceRepository::new(state.get_db());
    let records = repo.find_all().await?;
    Ok(ok(ListResponse::from(records)))
}
