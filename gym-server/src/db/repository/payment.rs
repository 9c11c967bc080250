//! Payment Repository
//!
//! 支付数据访问. Invoice numbers are generated here and backed by a unique
//! index; on the rare collision the insert is retried with a fresh number.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use shared::types::{PaymentMethod, PaymentStatus};
use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Payment, PaymentCreate, PaymentWithUser, RevenueStats};

const MAX_INVOICE_RETRIES: usize = 3;

fn is_invoice_conflict(err: &surrealdb::Error) -> bool {
    let text = err.to_string();
    text.contains("payment_invoice") || text.contains("already contains")
}

/// "INV-YYYYMM-NNNN" with a random 4-digit suffix
fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("INV-{}{:02}-{:04}", now.year(), now.month(), suffix)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalsRow {
    total: Option<f64>,
    payment_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WindowRow {
    total: Option<f64>,
}

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record a payment for `user`.
    ///
    /// Status defaults to Completed and method to Cash when the payload
    /// leaves them out; the caller decides whether the payment renews the
    /// membership.
    pub async fn create(&self, user: RecordId, data: PaymentCreate) -> RepoResult<Payment> {
        let status = data.status.unwrap_or(PaymentStatus::Completed);
        let method = data.payment_method.unwrap_or(PaymentMethod::Cash);
        let now = now_millis();

        for attempt in 1..=MAX_INVOICE_RETRIES {
            let invoice = generate_invoice_number(Utc::now());
            match self
                .try_create(user.clone(), data.clone(), status, method, invoice, now)
                .await
            {
                Ok(payment) => return Ok(payment),
                Err(e) if attempt < MAX_INVOICE_RETRIES && is_invoice_conflict(&e) => {
                    tracing::debug!(attempt, "Invoice number collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(RepoError::Database(
            "Failed to allocate invoice number".to_string(),
        ))
    }

    async fn try_create(
        &self,
        user: RecordId,
        data: PaymentCreate,
        status: PaymentStatus,
        method: PaymentMethod,
        invoice: String,
        now: i64,
    ) -> Result<Payment, surrealdb::Error> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE payment SET
                    user = $user,
                    amount = $amount,
                    plan = $plan,
                    status = $status,
                    paymentMethod = $method,
                    transactionId = $transaction_id,
                    paymentDate = $now,
                    description = $description,
                    invoiceNumber = $invoice,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("user", user))
            .bind(("amount", data.amount))
            .bind(("plan", data.plan))
            .bind(("status", status))
            .bind(("method", method))
            .bind(("transaction_id", data.transaction_id))
            .bind(("description", data.description))
            .bind(("invoice", invoice))
            .bind(("now", now))
            .await?;

        let created: Option<Payment> = result.take(0)?;
        created.ok_or_else(|| {
            surrealdb::Error::Api(surrealdb::error::Api::Query(
                "Failed to record payment".to_string(),
            ))
        })
    }

    /// A member's payment history, newest first
    pub async fn find_by_user(&self, user: RecordId) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE user = $user ORDER BY paymentDate DESC")
            .bind(("user", user))
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// All payments with payer names, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<PaymentWithUser>> {
        let payments: Vec<PaymentWithUser> = self
            .base
            .db()
            .query(
                r#"SELECT *, user.fullName AS userName FROM payment
                ORDER BY paymentDate DESC"#,
            )
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// Completed-payment revenue totals, with a windowed slice since `since`
    pub async fn revenue_stats(&self, since: i64, monthly_target: f64) -> RepoResult<RevenueStats> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                SELECT math::sum(amount) AS total, count() AS paymentCount
                    FROM payment WHERE status = 'Completed' GROUP ALL;
                SELECT math::sum(amount) AS total
                    FROM payment WHERE status = 'Completed' AND paymentDate >= $since GROUP ALL;
                "#,
            )
            .bind(("since", since))
            .await?;

        let totals: Option<TotalsRow> = result.take(0)?;
        let window: Option<WindowRow> = result.take(1)?;

        let totals = totals.unwrap_or(TotalsRow {
            total: None,
            payment_count: None,
        });

        Ok(RevenueStats {
            total_revenue: totals.total.unwrap_or(0.0),
            monthly_revenue: window.and_then(|w| w.total).unwrap_or(0.0),
            payment_count: totals.payment_count.unwrap_or(0),
            monthly_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn invoice_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let invoice = generate_invoice_number(now);
        assert!(invoice.starts_with("INV-202403-"));
        assert_eq!(invoice.len(), "INV-202403-0000".len());
        let suffix = invoice.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
