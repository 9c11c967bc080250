//! Schema Definitions
//!
//! 表结构与索引. Tables stay SCHEMALESS; the unique indexes below are the
//! only storage-level constraints and every statement is idempotent, so
//! `define` runs unconditionally on startup.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Define tables and unique indexes. Safe to run on every startup.
pub async fn define(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS class SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS attendance SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS payment SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS workout SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS payment_invoice ON payment FIELDS invoiceNumber UNIQUE;
        "#,
    )
    .await?;
    Ok(())
}
