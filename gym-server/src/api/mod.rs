//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证和密码流程接口
//! - [`users`] - 用户管理接口
//! - [`trainers`] - 教练目录和教练档案接口
//! - [`classes`] - 课程和报名接口
//! - [`attendance`] - 入场打卡接口
//! - [`payments`] - 缴费和营收统计接口
//! - [`workouts`] - 训练计划接口

pub mod auth;
pub mod health;

// Data models API
pub mod attendance;
pub mod classes;
pub mod payments;
pub mod trainers;
pub mod users;
pub mod workouts;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ok, ok_with_message};
