//! Workout API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post, routing::put};

use shared::types::Role;

use crate::auth::require_role;
use crate::core::ServerState;

/// Workout router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/workouts", routes())
}

fn routes() -> Router<ServerState> {
    // 会员路由：查询自己的计划、更新（归属检查在处理函数内）、打卡完成
    let member_routes = Router::new()
        .route("/my-workouts", get(handler::my_workouts))
        .route("/{id}", put(handler::update))
        .route("/{id}/complete", post(handler::complete));

    // 创建计划：教练或管理员
    let staff_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_role(&[
            Role::Trainer,
            Role::Admin,
        ])));

    member_routes.merge(staff_routes)
}
