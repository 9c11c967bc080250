use thiserror::Error;

/// 服务器启动/运行期错误
///
/// 请求处理路径上的错误用 [`crate::utils::AppError`]；
/// 这里只覆盖 HTTP 服务本身的生命周期。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器生命周期的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
