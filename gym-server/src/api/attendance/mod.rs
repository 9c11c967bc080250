//! Attendance API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post, routing::put};

use shared::types::Role;

use crate::auth::require_role;
use crate::core::ServerState;

/// Attendance router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<ServerState> {
    // 会员路由：打卡需要有效会籍，签退和查询只需登录
    let member_routes = Router::new()
        .route("/checkin", post(handler::check_in))
        .route("/{id}/checkout", put(handler::check_out))
        .route("/my-attendance", get(handler::my_attendance));

    // 全量查询：管理员或教练
    let staff_routes = Router::new()
        .route("/all", get(handler::list_all))
        .layer(middleware::from_fn(require_role(&[
            Role::Admin,
            Role::Trainer,
        ])));

    member_routes.merge(staff_routes)
}
