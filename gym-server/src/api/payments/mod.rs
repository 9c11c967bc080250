//! Payment API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    // 会员路由：登记自己的缴费、查询自己的账单
    let member_routes = Router::new()
        .route("/", post(handler::create))
        .route("/my-payments", get(handler::my_payments));

    // 管理路由：全量账单和营收统计
    let admin_routes = Router::new()
        .route("/all", get(handler::list_all))
        .route("/stats", get(handler::stats))
        .layer(middleware::from_fn(require_admin));

    member_routes.merge(admin_routes)
}
