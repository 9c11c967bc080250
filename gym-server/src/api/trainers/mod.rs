//! Trainer API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use shared::types::Role;

use crate::auth::require_role;
use crate::core::ServerState;

/// Trainer router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/trainers", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：公开（教练目录是宣传页面的一部分）
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 档案维护：教练本人或管理员
    let manage_routes = Router::new()
        .route("/{id}", put(handler::update_profile))
        .layer(middleware::from_fn(require_role(&[
            Role::Trainer,
            Role::Admin,
        ])));

    read_routes.merge(manage_routes)
}
