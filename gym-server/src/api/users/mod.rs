//! User API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

/// User router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    // 自助路由：任何已登录用户（本人/管理员判断在处理函数内）
    let self_routes = Router::new().route("/{id}", get(handler::get_by_id).put(handler::update));

    // 管理路由：仅管理员可用
    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    self_routes.merge(admin_routes)
}
