//! JWT Extractor
//!
//! Custom extractor for automatically validating JWT tokens

use axum::{extract::FromRequestParts, http::request::Parts};

use shared::types::Role;
use shared::util::now_millis;

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::membership::{MembershipCheck, reconcile_expiry};
use crate::security_log;

/// JWT Auth Extractor
///
/// Use this extractor in protected handlers to automatically validate JWT
/// and extract CurrentUser. Falls back to a full token check + database
/// load when the auth middleware has not already run on this route.
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::unauthorized());
            }
        };

        // Validate token
        let jwt_service = state.get_jwt_service();
        let claims = match jwt_service.validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );

                return match e {
                    crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                    _ => Err(AppError::invalid_token("Invalid token")),
                };
            }
        };

        let repo = UserRepository::new(state.get_db());
        let user = repo.find_by_id(&claims.sub).await?;
        let Some(user) = user else {
            security_log!("WARN", "auth_user_missing", user_id = claims.sub.clone());
            return Err(AppError::Unauthorized("User no longer exists".to_string()));
        };

        let current = CurrentUser::from(&user);

        // Store in extensions for potential reuse
        parts.extensions.insert(current.clone());

        Ok(current)
    }
}

/// 有效会籍提取器 (会籍门禁)
///
/// 套在需要有效会籍的处理函数上 (报名课程、入场打卡)。
/// 只约束 member 角色；教练和管理员不持有会籍，直接放行。
///
/// 没有后台过期任务：发现存储状态为 Active 但到期时间已过时，
/// 这里先把 Expired 写回数据库再拒绝请求，之后的读取都是修正后的状态。
///
/// # 错误
///
/// | 情况 | 响应 |
/// |------|------|
/// | Active 但已过期 | 403 "Your membership has expired. ..." |
/// | Pending / Expired | 403 "Your membership is not active. ..." |
#[derive(Debug, Clone)]
pub struct ActiveMember(pub CurrentUser);

impl FromRequestParts<ServerState> for ActiveMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != Role::Member {
            return Ok(ActiveMember(user));
        }

        match reconcile_expiry(user.membership_status, user.membership_expiry, now_millis()) {
            MembershipCheck::Active => Ok(ActiveMember(user)),
            MembershipCheck::JustExpired => {
                let repo = UserRepository::new(state.get_db());
                repo.mark_expired(&user.id).await?;
                security_log!("INFO", "membership_expired", user_id = user.id.clone());
                Err(AppError::forbidden(
                    "Your membership has expired. Please renew to continue.",
                ))
            }
            MembershipCheck::Inactive(_) => Err(AppError::forbidden(
                "Your membership is not active. Please renew to access this feature.",
            )),
        }
    }
}
