//! Payment API Handlers

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use shared::response::{ApiResponse, ListResponse};
use shared::types::PaymentStatus;
use shared::util::{DAY_MS, now_millis};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Payment, PaymentCreate, PaymentWithUser, RevenueStats};
use crate::db::repository::{PaymentRepository, UserRepository, parse_record_id};
use crate::membership::expiry_from;
use crate::utils::{AppResult, ok, validate_payload};

/// Record a payment for the calling user
///
/// A Completed payment renews the membership as a side effect: the plan is
/// taken from the payment and the expiry restarts from now.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    validate_payload(&payload)?;

    let member = parse_record_id(&current.id, "user")?;

    let repo = PaymentRepository::new(state.get_db());
    let payment = repo.create(member, payload).await?;

    if payment.status == PaymentStatus::Completed {
        let expiry = expiry_from(now_millis(), state.config.membership_duration_days);
        let users = UserRepository::new(state.get_db());
        users
            .apply_renewal(&current.id, payment.plan, expiry)
            .await?;

        tracing::info!(
            user_id = %current.id,
            plan = %payment.plan,
            invoice = %payment.invoice_number,
            "Membership renewed by payment"
        );
    }

    Ok((StatusCode::CREATED, ok(payment)))
}

/// Own payment history, most recent first
pub async fn my_payments(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<ListResponse<Payment>>>> {
    let member = parse_record_id(&current.id, "user")?;

    let repo = PaymentRepository::new(state.get_db());
    let payments = repo.find_by_user(member).await?;
    Ok(ok(ListResponse::from(payments)))
}

/// All payments with payer names (admin)
pub async fn list_all(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<ListResponse<PaymentWithUser>>>> {
    let repo = PaymentRepository::new(state.get_db());
    let payments = repo.find_all().await?;
    Ok(ok(ListResponse::from(payments)))
}

/// Revenue statistics (admin)
///
/// Monthly revenue is a trailing 30-day window, not a calendar month.
pub async fn stats(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<RevenueStats>>> {
    let since = now_millis() - 30 * DAY_MS;

    let repo = PaymentRepository::new(state.get_db());
    let stats = repo
        .revenue_stats(since, state.config.monthly_revenue_target)
        .await?;
    Ok(ok(stats))
}
