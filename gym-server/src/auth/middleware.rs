//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use shared::types::{MembershipStatus, Role};

use crate::AppError;
use crate::auth::JwtService;
use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::UserRepository;
use crate::security_log;

/// 当前用户上下文 (认证中间件从数据库加载)
///
/// 与令牌里的 Claims 不同，这里的字段来自数据库的最新状态，
/// 所以改密码或改角色后旧令牌不会携带过时的权限。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID ("user:key" 格式)
    pub id: String,
    /// 姓名
    pub full_name: String,
    /// 邮箱
    pub email: String,
    /// 角色
    pub role: Role,
    /// 会籍状态 (存储值，未做过期折算)
    pub membership_status: MembershipStatus,
    /// 会籍到期时间 (Unix millis)
    pub membership_expiry: i64,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            membership_status: user.membership_status,
            membership_expiry: user.membership_expiry,
        }
    }
}

impl CurrentUser {
    /// 是否管理员
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 是否教练
    pub fn is_trainer(&self) -> bool {
        self.role == Role::Trainer
    }
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 再从数据库加载用户。验证成功后将 [`CurrentUser`] 注入请求扩展
/// (`req.extensions_mut().insert(user)`)。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - `/api/auth/register` / `/api/auth/login` / `/api/auth/forgot-password`
/// - `/api/auth/reset-password/{token}`
/// - `GET /api/classes*` 和 `GET /api/trainers*` (公开浏览)
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
/// | 用户已被删除 | 401 Unauthorized |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证
    let is_public_api_route = matches!(
        path,
        "/api/auth/register" | "/api/auth/login" | "/api/auth/forgot-password"
    ) || path.starts_with("/api/auth/reset-password/")
        || (req.method() == http::Method::GET
            && (path == "/api/classes"
                || path.starts_with("/api/classes/")
                || path == "/api/trainers"
                || path.starts_with("/api/trainers/")));
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    let claims = match jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            return match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    // 加载数据库中的用户 (令牌有效但用户可能已被删除)
    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_id(&claims.sub).await?;
    let Some(user) = user else {
        security_log!("WARN", "auth_user_missing", user_id = claims.sub.clone());
        return Err(AppError::Unauthorized("User no longer exists".to_string()));
    };

    req.extensions_mut().insert(CurrentUser::from(&user));
    Ok(next.run(req).await)
}

/// 角色检查中间件 - 要求指定角色之一
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// use shared::types::Role;
/// Router::new()
///     .route("/api/classes", post(handler::create))
///     .layer(middleware::from_fn(require_role(&[Role::Admin, Role::Trainer])));
/// ```
///
/// # 错误
///
/// 角色不符返回 403 Forbidden
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !roles.contains(&user.role) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id.clone(),
                    user_role = user.role.as_str().to_string()
                );
                return Err(AppError::forbidden(format!(
                    "User role {} is not authorized to access this route",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员中间件 - 要求管理员角色
///
/// # 错误
///
/// 非管理员返回 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            user_role = user.role.as_str().to_string()
        );
        return Err(AppError::forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        )));
    }

    Ok(next.run(req).await)
}

