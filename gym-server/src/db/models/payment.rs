//! Payment Model
//!
//! 支付记录. Each payment targets a membership plan; a `Completed` payment
//! renews the payer's membership as a side effect in the handler. Invoice
//! numbers are generated server side and unique-indexed.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use shared::types::{MembershipPlan, PaymentMethod, PaymentStatus};

use super::serde_helpers;

/// Payment ID type
pub type PaymentId = RecordId;

/// Payment model matching the SurrealDB schema (stored camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PaymentId>,
    /// Record link to the paying user
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub amount: f64,
    /// Membership plan the payment buys
    pub plan: MembershipPlan,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Payment date (Unix millis)
    pub payment_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "INV-YYYYMM-NNNN"
    pub invoice_number: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Payment {
    /// Record id as "payment:key" string (empty when unsaved)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }
}

/// Payment joined with the payer's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithUser {
    #[serde(flatten)]
    pub payment: Payment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Create payment payload; payer is always the authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreate {
    #[validate(range(min = 0.01, message = "Amount must be greater than zero"))]
    pub amount: f64,
    pub plan: MembershipPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Revenue aggregates for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStats {
    pub total_revenue: f64,
    pub monthly_revenue: f64,
    pub payment_count: u64,
    pub monthly_target: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_defaults_apply() {
        let payment: Payment = serde_json::from_value(serde_json::json!({
            "user": "user:m1",
            "amount": 49.99,
            "plan": "Premium",
            "paymentDate": 1_700_000_000_000_i64,
            "invoiceNumber": "INV-202311-0042"
        }))
        .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.payment_method, PaymentMethod::Cash);
        assert_eq!(payment.plan, MembershipPlan::Premium);
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        let payload = PaymentCreate {
            amount: 0.0,
            plan: MembershipPlan::Basic,
            status: None,
            payment_method: None,
            transaction_id: None,
            description: None,
        };
        assert!(payload.validate().is_err());
    }
}
