//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`AppResult`] - 应用错误类型
//! - [`validation`] - 请求校验辅助函数
//! - [`logger`] - 日志初始化

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResult, FieldError};
pub use error::{ok, ok_with_message};
pub use validation::validate_payload;
