//! User Repository
//!
//! 用户数据访问. Emails are normalized (trim + lowercase) before every
//! lookup and write so the unique index works case-insensitively. Reset
//! tokens are stored as SHA-256 digests; the raw token leaves this module
//! exactly once, as the return value of `issue_reset_token`.

use std::collections::HashMap;

use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use shared::types::{MembershipPlan, MembershipStatus};
use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{TrainerProfileUpdate, User, UserCreate, UserUpdate};

/// How `delete` disposed of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    Anonymized,
}

/// Aggregate member counts for the admin dashboard
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total_members: u64,
    pub active_members: u64,
    pub expired_members: u64,
    pub plan_distribution: HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct PlanCountRow {
    plan: String,
    total: u64,
}

/// Map unique-index violations on `user_email` to a Duplicate error
fn map_email_conflict(err: surrealdb::Error) -> RepoError {
    let text = err.to_string();
    if text.contains("user_email") || text.contains("already contains") {
        RepoError::Duplicate("Email already registered".to_string())
    } else {
        RepoError::Database(text)
    }
}

fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY fullName")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find all trainers
    pub async fn find_trainers(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE role = 'trainer' ORDER BY fullName")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(id, "user")?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email (normalized)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        let email = data.email.trim().to_lowercase();

        // Check duplicate email
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate("Email already registered".to_string()));
        }

        // Hash password
        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let now = now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    fullName = $full_name,
                    email = $email,
                    passwordHash = $password_hash,
                    phone = $phone,
                    dateOfBirth = $date_of_birth,
                    role = $role,
                    membershipPlan = $membership_plan,
                    membershipStatus = $membership_status,
                    membershipExpiry = $membership_expiry,
                    joinDate = $join_date,
                    isEmailVerified = false,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("full_name", data.full_name))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("phone", data.phone))
            .bind(("date_of_birth", data.date_of_birth))
            .bind(("role", data.role))
            .bind(("membership_plan", data.membership_plan))
            .bind(("membership_status", data.membership_status))
            .bind(("membership_expiry", data.membership_expiry))
            .bind(("join_date", data.join_date))
            .bind(("now", now))
            .await
            .map_err(map_email_conflict)?;

        // Unique index races still land here
        let created: Option<User> = result.take(0).map_err(map_email_conflict)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update a user's profile and (admin only, enforced by the handler)
    /// membership fields
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing = parse_record_id(id, "user")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        // Check duplicate email if changing
        let email = data.email.map(|e| e.trim().to_lowercase());
        if let Some(ref new_email) = email
            && new_email != &existing.email
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate("Email already registered".to_string()));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    fullName = $full_name OR fullName,
                    email = $email OR email,
                    phone = $phone OR phone,
                    dateOfBirth = IF $has_date_of_birth THEN $date_of_birth ELSE dateOfBirth END,
                    emergencyContact = IF $has_emergency_contact THEN $emergency_contact ELSE emergencyContact END,
                    profileImage = $profile_image OR profileImage,
                    role = IF $has_role THEN $role ELSE role END,
                    membershipPlan = IF $has_membership_plan THEN $membership_plan ELSE membershipPlan END,
                    membershipStatus = IF $has_membership_status THEN $membership_status ELSE membershipStatus END,
                    membershipExpiry = IF $has_membership_expiry THEN $membership_expiry ELSE membershipExpiry END,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("full_name", data.full_name))
            .bind(("email", email))
            .bind(("phone", data.phone))
            .bind(("has_date_of_birth", data.date_of_birth.is_some()))
            .bind(("date_of_birth", data.date_of_birth))
            .bind(("has_emergency_contact", data.emergency_contact.is_some()))
            .bind(("emergency_contact", data.emergency_contact))
            .bind(("profile_image", data.profile_image))
            .bind(("has_role", data.role.is_some()))
            .bind(("role", data.role))
            .bind(("has_membership_plan", data.membership_plan.is_some()))
            .bind(("membership_plan", data.membership_plan))
            .bind(("has_membership_status", data.membership_status.is_some()))
            .bind(("membership_status", data.membership_status))
            .bind(("has_membership_expiry", data.membership_expiry.is_some()))
            .bind(("membership_expiry", data.membership_expiry))
            .bind(("now", now_millis()))
            .await
            .map_err(map_email_conflict)?;

        result
            .take::<Option<User>>(0)
            .map_err(map_email_conflict)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Replace the trainer profile fields
    pub async fn update_trainer_profile(
        &self,
        id: &str,
        data: TrainerProfileUpdate,
    ) -> RepoResult<User> {
        let thing = parse_record_id(id, "user")?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    specialization = IF $has_specialization THEN $specialization ELSE specialization END,
                    bio = $bio OR bio,
                    certifications = IF $has_certifications THEN $certifications ELSE certifications END,
                    availability = IF $has_availability THEN $availability ELSE availability END,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("has_specialization", data.specialization.is_some()))
            .bind(("specialization", data.specialization))
            .bind(("bio", data.bio))
            .bind(("has_certifications", data.certifications.is_some()))
            .bind(("certifications", data.certifications))
            .bind(("has_availability", data.availability.is_some()))
            .bind(("availability", data.availability))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Set a new password (already verified by the caller)
    pub async fn set_password(&self, id: &str, new_password: &str) -> RepoResult<()> {
        let thing = parse_record_id(id, "user")?;
        let password_hash = User::hash_password(new_password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        self.base
            .db()
            .query("UPDATE $thing SET passwordHash = $password_hash, updatedAt = $now")
            .bind(("thing", thing))
            .bind(("password_hash", password_hash))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Apply a completed payment: new plan, Active status, new expiry
    pub async fn apply_renewal(
        &self,
        id: &str,
        plan: MembershipPlan,
        expiry: i64,
    ) -> RepoResult<User> {
        let thing = parse_record_id(id, "user")?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    membershipPlan = $plan,
                    membershipStatus = $status,
                    membershipExpiry = $expiry,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("plan", plan))
            .bind(("status", MembershipStatus::Active))
            .bind(("expiry", expiry))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Persist the lazy expiry flip
    pub async fn mark_expired(&self, id: &str) -> RepoResult<()> {
        let thing = parse_record_id(id, "user")?;
        self.base
            .db()
            .query("UPDATE $thing SET membershipStatus = $status, updatedAt = $now")
            .bind(("thing", thing))
            .bind(("status", MembershipStatus::Expired))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Generate a reset token for the account behind `email`.
    ///
    /// Returns the raw token; only its digest is stored.
    pub async fn issue_reset_token(&self, email: &str, ttl_ms: i64) -> RepoResult<String> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| RepoError::NotFound("No user with that email".to_string()))?;
        let thing = user
            .id
            .ok_or_else(|| RepoError::Database("User record missing id".to_string()))?;

        let rng = SystemRandom::new();
        let mut bytes = [0u8; 20];
        rng.fill(&mut bytes)
            .map_err(|_| RepoError::Database("Failed to generate reset token".to_string()))?;
        let raw = hex::encode(bytes);

        let now = now_millis();
        self.base
            .db()
            .query(
                r#"UPDATE $thing SET
                    resetTokenHash = $digest,
                    resetTokenExpires = $expires,
                    updatedAt = $now"#,
            )
            .bind(("thing", thing))
            .bind(("digest", hash_reset_token(&raw)))
            .bind(("expires", now + ttl_ms))
            .bind(("now", now))
            .await?;

        Ok(raw)
    }

    /// Redeem a raw reset token: set the new password and clear the token.
    ///
    /// The WHERE clause makes redemption single-use; a second call with the
    /// same token matches nothing.
    pub async fn consume_reset_token(&self, raw_token: &str, new_password: &str) -> RepoResult<User> {
        let password_hash = User::hash_password(new_password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        let now = now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE user SET
                    passwordHash = $password_hash,
                    resetTokenHash = NONE,
                    resetTokenExpires = NONE,
                    updatedAt = $now
                WHERE resetTokenHash = $digest AND resetTokenExpires > $now
                RETURN AFTER"#,
            )
            .bind(("password_hash", password_hash))
            .bind(("digest", hash_reset_token(raw_token)))
            .bind(("now", now))
            .await?;

        let updated: Vec<User> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Validation("Invalid or expired token".to_string()))
    }

    /// Remove a user according to the configured policy.
    ///
    /// Hard deletion also drops the user from class rosters; anonymization
    /// keeps the record (and its payment history) but strips PII and locks
    /// the account behind a random password.
    pub async fn delete(&self, id: &str, anonymize: bool) -> RepoResult<DeletionOutcome> {
        let thing = parse_record_id(id, "user")?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        if anonymize {
            let rng = SystemRandom::new();
            let mut bytes = [0u8; 32];
            rng.fill(&mut bytes)
                .map_err(|_| RepoError::Database("Failed to generate password".to_string()))?;
            let lock_hash = User::hash_password(&hex::encode(bytes))
                .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

            let placeholder_email =
                format!("deleted-{}@example.invalid", thing.key());

            self.base
                .db()
                .query(
                    r#"UPDATE $thing SET
                        fullName = 'Deleted User',
                        email = $email,
                        passwordHash = $password_hash,
                        phone = NONE,
                        dateOfBirth = NONE,
                        emergencyContact = NONE,
                        profileImage = NONE,
                        isEmailVerified = false,
                        resetTokenHash = NONE,
                        resetTokenExpires = NONE,
                        bio = NONE,
                        specialization = [],
                        certifications = [],
                        availability = {},
                        updatedAt = $now"#,
                )
                .bind(("thing", thing))
                .bind(("email", placeholder_email))
                .bind(("password_hash", lock_hash))
                .bind(("now", now_millis()))
                .await?;

            tracing::info!(user_id = %id, "User anonymized");
            return Ok(DeletionOutcome::Anonymized);
        }

        self.base
            .db()
            .query(
                r#"UPDATE class SET enrolled -= $thing, updatedAt = $now WHERE $thing INSIDE enrolled;
                DELETE $thing;"#,
            )
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .await?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(DeletionOutcome::Deleted)
    }

    /// Aggregate member counts and plan distribution
    pub async fn member_stats(&self) -> RepoResult<MemberStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT count() AS total FROM user WHERE role = 'member' GROUP ALL;
                SELECT count() AS total FROM user WHERE role = 'member' AND membershipStatus = 'Active' GROUP ALL;
                SELECT count() AS total FROM user WHERE role = 'member' AND membershipStatus = 'Expired' GROUP ALL;
                SELECT membershipPlan AS plan, count() AS total FROM user WHERE role = 'member' GROUP BY plan;
                "#,
            )
            .await?;

        let total: Option<CountRow> = result.take(0)?;
        let active: Option<CountRow> = result.take(1)?;
        let expired: Option<CountRow> = result.take(2)?;
        let plans: Vec<PlanCountRow> = result.take(3)?;

        Ok(MemberStats {
            total_members: total.map(|r| r.total).unwrap_or(0),
            active_members: active.map(|r| r.total).unwrap_or(0),
            expired_members: expired.map(|r| r.total).unwrap_or(0),
            plan_distribution: plans.into_iter().map(|r| (r.plan, r.total)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_token_digest_is_stable_hex() {
        let digest = hash_reset_token("abc123");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_reset_token("abc123"));
        assert_ne!(digest, hash_reset_token("abc124"));
    }

    #[test]
    fn email_conflict_mapping_matches_index_errors() {
        let err = surrealdb::Error::Api(surrealdb::error::Api::Query(
            "Database index `user_email` already contains 'a@b.c'".to_string(),
        ));
        assert!(matches!(map_email_conflict(err), RepoError::Duplicate(_)));
    }
}
