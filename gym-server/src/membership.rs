//! 会员生命周期
//!
//! 会员有效期的纯计算逻辑。没有后台任务：过期检测在下一次受保护请求
//! 到达时惰性执行（见 `auth::extractor::ActiveMember`），
//! 状态修正由调用方持久化。

use shared::types::MembershipStatus;
use shared::util::DAY_MS;

/// Default membership duration granted at registration and on renewal
pub const DEFAULT_MEMBERSHIP_DAYS: i64 = 365;

/// Compute an expiry timestamp `days` from `now` (both Unix millis)
pub fn expiry_from(now: i64, days: i64) -> i64 {
    now + days * DAY_MS
}

/// Outcome of reconciling a membership against the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCheck {
    /// Membership is active and unexpired
    Active,
    /// Stored status says Active but the expiry has passed; the caller must
    /// persist the flip to `Expired` before rejecting the request
    JustExpired,
    /// Membership was already inactive (Pending or Expired)
    Inactive(MembershipStatus),
}

/// Reconcile a membership state against `now`.
///
/// Pure function so the transition matrix is testable without a store:
/// the status check runs first, then the expiry comparison. A `Pending`
/// membership with a past expiry is reported as `Inactive(Pending)`, not
/// flipped.
pub fn reconcile_expiry(status: MembershipStatus, expiry: i64, now: i64) -> MembershipCheck {
    if status != MembershipStatus::Active {
        return MembershipCheck::Inactive(status);
    }
    if expiry < now {
        return MembershipCheck::JustExpired;
    }
    MembershipCheck::Active
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn expiry_is_days_after_now() {
        assert_eq!(expiry_from(NOW, 365), NOW + 365 * DAY_MS);
        assert_eq!(expiry_from(NOW, 0), NOW);
    }

    #[test]
    fn active_and_unexpired_passes() {
        assert_eq!(
            reconcile_expiry(MembershipStatus::Active, NOW + 1, NOW),
            MembershipCheck::Active
        );
        // Expiry exactly at now is still valid
        assert_eq!(
            reconcile_expiry(MembershipStatus::Active, NOW, NOW),
            MembershipCheck::Active
        );
    }

    #[test]
    fn active_but_stale_requires_flip() {
        assert_eq!(
            reconcile_expiry(MembershipStatus::Active, NOW - 1, NOW),
            MembershipCheck::JustExpired
        );
    }

    #[test]
    fn non_active_statuses_are_reported_without_flip() {
        assert_eq!(
            reconcile_expiry(MembershipStatus::Pending, NOW - DAY_MS, NOW),
            MembershipCheck::Inactive(MembershipStatus::Pending)
        );
        assert_eq!(
            reconcile_expiry(MembershipStatus::Expired, NOW + DAY_MS, NOW),
            MembershipCheck::Inactive(MembershipStatus::Expired)
        );
    }
}
