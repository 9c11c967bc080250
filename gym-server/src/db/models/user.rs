//! User Model
//!
//! Members, trainers and admins share one `user` table; trainer profile
//! fields stay empty for plain members. Secret fields (password hash, reset
//! token) are excluded from serialization at the serde level, so no call
//! site can leak them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::client::UserInfo;
use shared::types::{MembershipPlan, MembershipStatus, Role, Weekday};

use super::serde_helpers;

/// User ID type
pub type UserId = RecordId;

/// Emergency contact subdocument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// User model matching the SurrealDB schema (stored camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Date of birth (Unix millis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub membership_plan: MembershipPlan,
    #[serde(default)]
    pub membership_status: MembershipStatus,
    /// Membership expiry (Unix millis)
    pub membership_expiry: i64,
    /// Join date (Unix millis)
    pub join_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_email_verified: bool,
    #[serde(default, skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(default, skip_serializing)]
    pub reset_token_expires: Option<i64>,

    // === Trainer profile ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specialization: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    /// Weekly availability: weekday -> time ranges ("09:00-12:00")
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub availability: HashMap<Weekday, Vec<String>>,

    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Create user payload (register endpoint and seeder)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<i64>,
    pub role: Role,
    pub membership_plan: MembershipPlan,
    pub membership_status: MembershipStatus,
    pub membership_expiry: i64,
    pub join_date: i64,
}

/// Update user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_plan: Option<MembershipPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_status: Option<MembershipStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_expiry: Option<i64>,
}

impl UserUpdate {
    /// Fields only an admin may change
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some()
            || self.membership_plan.is_some()
            || self.membership_status.is_some()
            || self.membership_expiry.is_some()
    }
}

/// Trainer profile update payload (trainer-editable subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<HashMap<Weekday, Vec<String>>>,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Record id as "user:key" string (empty when unsaved)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id_string(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            membership_plan: user.membership_plan,
            membership_status: user.membership_status,
            membership_expiry: user.membership_expiry,
            join_date: user.join_date,
        }
    }
}
