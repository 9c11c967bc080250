//! Client-facing auth types
//!
//! Request/response DTOs used in API communication. These types are shared
//! between the gym server and any API client, so the wire format (camelCase)
//! is fixed here.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{MembershipPlan, MembershipStatus, Role};

// Re-export ApiResponse from response module
pub use crate::response::ApiResponse;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Date of birth (Unix millis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<i64>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Forgot password request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

/// Reset password request (token travels in the URL path)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Password change request for an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Token response returned by register/login/reset flows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Public user information embedded in auth responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub membership_plan: MembershipPlan,
    pub membership_status: MembershipStatus,
    /// Membership expiry (Unix millis)
    pub membership_expiry: i64,
    /// Join date (Unix millis)
    pub join_date: i64,
}

/// Forgot-password response data
///
/// There is no mail delivery; the raw token is handed back to the transport
/// caller and must be presented on the reset endpoint within its TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub reset_token: String,
}
