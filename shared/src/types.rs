//! Domain enumerations
//!
//! Shared vocabulary between the server and API clients. Serialized forms are
//! part of the wire and storage format, so renames here are breaking changes.

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Account role (账户角色)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Trainer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Trainer => "trainer",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership plan tier (会员套餐)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipPlan {
    Basic,
    Premium,
    #[serde(rename = "VIP")]
    Vip,
}

impl MembershipPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipPlan::Basic => "Basic",
            MembershipPlan::Premium => "Premium",
            MembershipPlan::Vip => "VIP",
        }
    }
}

impl Default for MembershipPlan {
    fn default() -> Self {
        MembershipPlan::Basic
    }
}

impl std::fmt::Display for MembershipPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership status (会员状态)
///
/// `Expired` is derived lazily: a stale `Active` record is flipped the next
/// time a membership-gated request reconciles it against the expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    Active,
    Expired,
    Pending,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "Active",
            MembershipStatus::Expired => "Expired",
            MembershipStatus::Pending => "Pending",
        }
    }
}

impl Default for MembershipStatus {
    fn default() -> Self {
        MembershipStatus::Pending
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        };
        f.write_str(s)
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Online,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

/// Day of week used in class schedules and trainer availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Class category (课程分类)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassCategory {
    Cardio,
    Strength,
    Yoga,
    CrossFit,
    Pilates,
    Cycling,
    Dance,
    Boxing,
    Other,
}

impl Default for ClassCategory {
    fn default() -> Self {
        ClassCategory::Other
    }
}

/// Difficulty level for classes and workout plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Beginner
    }
}

/// Workout plan category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutCategory {
    Strength,
    Cardio,
    Flexibility,
    Endurance,
    Mixed,
}

impl Default for WorkoutCategory {
    fn default() -> Self {
        WorkoutCategory::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_formats_are_stable() {
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), "\"member\"");
        assert_eq!(
            serde_json::to_string(&MembershipPlan::Vip).unwrap(),
            "\"VIP\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"Bank Transfer\""
        );
        assert_eq!(
            serde_json::to_string(&Weekday::Monday).unwrap(),
            "\"Monday\""
        );
    }

    #[test]
    fn role_round_trip() {
        let role: Role = serde_json::from_str("\"trainer\"").unwrap();
        assert_eq!(role, Role::Trainer);
        assert_eq!(role.to_string(), "trainer");
    }
}
