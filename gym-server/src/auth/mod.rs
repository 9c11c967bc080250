//! 认证授权模块
//!
//! 提供 JWT 认证、角色与会籍检查：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`ActiveMember`] - 有效会籍提取器
//! - [`require_auth`] - 认证中间件
//! - [`require_role`] - 角色检查中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use extractor::ActiveMember;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUser, require_admin, require_auth, require_role};
