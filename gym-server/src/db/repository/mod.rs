//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables using Graph DB patterns.

// Auth + profiles
pub mod user;

// Scheduling
pub mod class;

// Visits
pub mod attendance;

// Billing
pub mod payment;

// Training
pub mod workout;

// Re-exports
pub use attendance::AttendanceRepository;
pub use class::{ClassRepository, EnrollOutcome};
pub use payment::PaymentRepository;
pub use user::{DeletionOutcome, MemberStats, UserRepository};
pub use workout::WorkoutRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "user:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("user", "abc");
//   - 获取表名: id.table()
//   - 获取纯ID: id.key().to_string()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Parse a "table:id" string, rejecting ids from the wrong table
pub(crate) fn parse_record_id(id: &str, table: &str) -> RepoResult<surrealdb::RecordId> {
    let thing: surrealdb::RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if thing.table() != table {
        return Err(RepoError::Validation(format!("Invalid ID: {}", id)));
    }
    Ok(thing)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_id_enforces_table() {
        assert!(parse_record_id("user:abc", "user").is_ok());
        assert!(matches!(
            parse_record_id("class:abc", "user"),
            Err(RepoError::Validation(_))
        ));
        assert!(matches!(
            parse_record_id("not-an-id", "user"),
            Err(RepoError::Validation(_))
        ));
    }
}
