//! Attendance Repository
//!
//! 出勤数据访问. Check-out recomputes the duration from the stored check-in
//! time, so repeating a check-out simply moves the end of the visit
//! (last writer wins).

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::attendance::duration_minutes;
use crate::db::models::{Attendance, AttendanceDetail, AttendanceWithClass};

#[derive(Clone)]
pub struct AttendanceRepository {
    base: BaseRepository,
}

impl AttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record a new visit
    pub async fn check_in(
        &self,
        user: RecordId,
        class: Option<RecordId>,
        notes: Option<String>,
    ) -> RepoResult<Attendance> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE attendance SET
                    user = $user,
                    class = $class,
                    checkInTime = $now,
                    notes = $notes,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("user", user))
            .bind(("class", class))
            .bind(("notes", notes))
            .bind(("now", now))
            .await?;

        let created: Option<Attendance> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to record check-in".to_string()))
    }

    /// Find attendance record by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Attendance>> {
        let thing = parse_record_id(id, "attendance")?;
        let record: Option<Attendance> = self.base.db().select(thing).await?;
        Ok(record)
    }

    /// Close a visit, stamping the check-out time and the derived duration
    pub async fn check_out(&self, id: &str) -> RepoResult<Attendance> {
        let thing = parse_record_id(id, "attendance")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Attendance record {} not found", id)))?;

        let now = now_millis();
        let duration = duration_minutes(existing.check_in_time, now);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    checkOutTime = $now,
                    durationMinutes = $duration,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("duration", duration))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Attendance>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Attendance record {} not found", id)))
    }

    /// A member's visit history, newest first
    pub async fn find_by_user(&self, user: RecordId) -> RepoResult<Vec<AttendanceWithClass>> {
        let records: Vec<AttendanceWithClass> = self
            .base
            .db()
            .query(
                r#"SELECT *, class.name AS className FROM attendance
                WHERE user = $user ORDER BY checkInTime DESC"#,
            )
            .bind(("user", user))
            .await?
            .take(0)?;
        Ok(records)
    }

    /// All visits with member and class names, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<AttendanceDetail>> {
        let records: Vec<AttendanceDetail> = self
            .base
            .db()
            .query(
                r#"SELECT *, user.fullName AS userName, class.name AS className
                FROM attendance ORDER BY checkInTime DESC"#,
            )
            .await?
            .take(0)?;
        Ok(records)
    }
}
