//! Class API Module

mod handler;

use axum::{Router, middleware, routing::delete, routing::get, routing::post, routing::put};

use shared::types::Role;

use crate::auth::{require_admin, require_role};
use crate::core::ServerState;

/// Class router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/classes", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：公开（课程表是宣传页面的一部分）
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 报名路由：已登录会员（会籍门禁由 ActiveMember 提取器实施）
    let member_routes = Router::new()
        .route("/{id}/enroll", post(handler::enroll))
        .route("/{id}/unenroll", delete(handler::unenroll));

    // 管理路由：管理员或教练
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_role(&[
            Role::Admin,
            Role::Trainer,
        ])));

    // 删除：仅管理员
    let admin_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes
        .merge(member_routes)
        .merge(manage_routes)
        .merge(admin_routes)
}
