//! Class Repository
//!
//! 课程数据访问. Enrollment is a single conditional UPDATE so the capacity
//! check and the roster append commit atomically; losing concurrent callers
//! see an empty result and get classified against the current roster.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Class, ClassCreate, ClassUpdate, ClassWithTrainer, RosterEntry};

/// Bounded retries for RocksDB optimistic transaction conflicts. Sized so a
/// burst of concurrent joiners on one class drains without surfacing errors.
const MAX_TXN_RETRIES: usize = 10;

fn is_txn_conflict(err: &surrealdb::Error) -> bool {
    err.to_string().to_lowercase().contains("conflict")
}

/// Result of an enrollment attempt
#[derive(Debug, Clone)]
pub enum EnrollOutcome {
    Enrolled(Class),
    AlreadyEnrolled,
    Full,
}

#[derive(Clone)]
pub struct ClassRepository {
    base: BaseRepository,
}

impl ClassRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all classes with their trainer names
    pub async fn find_all(&self) -> RepoResult<Vec<ClassWithTrainer>> {
        let classes: Vec<ClassWithTrainer> = self
            .base
            .db()
            .query("SELECT *, trainer.fullName AS trainerName FROM class ORDER BY name")
            .await?
            .take(0)?;
        Ok(classes)
    }

    /// Find class by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Class>> {
        let thing = parse_record_id(id, "class")?;
        let class: Option<Class> = self.base.db().select(thing).await?;
        Ok(class)
    }

    /// Find class by id with its trainer name
    pub async fn find_by_id_with_trainer(&self, id: &str) -> RepoResult<Option<ClassWithTrainer>> {
        let thing = parse_record_id(id, "class")?;
        let mut result = self
            .base
            .db()
            .query("SELECT *, trainer.fullName AS trainerName FROM $thing")
            .bind(("thing", thing))
            .await?;
        Ok(result.take::<Option<ClassWithTrainer>>(0)?)
    }

    /// Public subset of the enrolled members
    pub async fn roster(&self, enrolled: &[RecordId]) -> RepoResult<Vec<RosterEntry>> {
        if enrolled.is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<RosterEntry> = self
            .base
            .db()
            .query("SELECT id, fullName, email FROM $ids ORDER BY fullName")
            .bind(("ids", enrolled.to_vec()))
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Create a new class; `trainer` has already been resolved by the caller
    pub async fn create(&self, data: ClassCreate, trainer: RecordId) -> RepoResult<Class> {
        if data.capacity == 0 {
            return Err(RepoError::Validation(
                "Capacity must be at least 1".to_string(),
            ));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE class SET
                    name = $name,
                    description = $description,
                    trainer = $trainer,
                    schedule = $schedule,
                    capacity = $capacity,
                    enrolled = [],
                    category = $category,
                    difficulty = $difficulty,
                    durationMinutes = $duration_minutes,
                    isActive = true,
                    imageUrl = $image_url,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("trainer", trainer))
            .bind(("schedule", data.schedule))
            .bind(("capacity", data.capacity))
            .bind(("category", data.category))
            .bind(("difficulty", data.difficulty))
            .bind(("duration_minutes", data.duration_minutes))
            .bind(("image_url", data.image_url))
            .bind(("now", now))
            .await?;

        let created: Option<Class> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create class".to_string()))
    }

    /// Update a class; `trainer` is the re-resolved record link, if changing
    pub async fn update(
        &self,
        id: &str,
        data: ClassUpdate,
        trainer: Option<RecordId>,
    ) -> RepoResult<Class> {
        let thing = parse_record_id(id, "class")?;

        if let Some(0) = data.capacity {
            return Err(RepoError::Validation(
                "Capacity must be at least 1".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    description = $description OR description,
                    trainer = IF $has_trainer THEN $trainer ELSE trainer END,
                    schedule = IF $has_schedule THEN $schedule ELSE schedule END,
                    capacity = IF $has_capacity THEN $capacity ELSE capacity END,
                    category = IF $has_category THEN $category ELSE category END,
                    difficulty = IF $has_difficulty THEN $difficulty ELSE difficulty END,
                    durationMinutes = IF $has_duration THEN $duration ELSE durationMinutes END,
                    isActive = IF $has_is_active THEN $is_active ELSE isActive END,
                    imageUrl = $image_url OR imageUrl,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("has_trainer", trainer.is_some()))
            .bind(("trainer", trainer))
            .bind(("has_schedule", data.schedule.is_some()))
            .bind(("schedule", data.schedule))
            .bind(("has_capacity", data.capacity.is_some()))
            .bind(("capacity", data.capacity))
            .bind(("has_category", data.category.is_some()))
            .bind(("category", data.category))
            .bind(("has_difficulty", data.difficulty.is_some()))
            .bind(("difficulty", data.difficulty))
            .bind(("has_duration", data.duration_minutes.is_some()))
            .bind(("duration", data.duration_minutes))
            .bind(("has_is_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .bind(("image_url", data.image_url))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Class>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Class {} not found", id)))
    }

    /// Hard delete a class
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id, "class")?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Class {} not found", id)))?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Enroll a member.
    ///
    /// The WHERE clause only matches while a seat is free and the member is
    /// not already on the roster, so two racing calls cannot both take the
    /// last seat.
    pub async fn enroll(&self, class_id: &str, user: &RecordId) -> RepoResult<EnrollOutcome> {
        let thing = parse_record_id(class_id, "class")?;

        let mut updated: Option<Class> = None;
        for attempt in 1..=MAX_TXN_RETRIES {
            match self.try_enroll(thing.clone(), user.clone()).await {
                Ok(result) => {
                    updated = result;
                    break;
                }
                Err(e) if attempt < MAX_TXN_RETRIES && is_txn_conflict(&e) => {
                    tracing::debug!(attempt, class_id, "Enrollment write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(class) = updated {
            return Ok(EnrollOutcome::Enrolled(class));
        }

        // The guard rejected the write; classify against the current roster
        let current = self
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Class {} not found", class_id)))?;
        if current.enrolled.iter().any(|m| m == user) {
            Ok(EnrollOutcome::AlreadyEnrolled)
        } else {
            Ok(EnrollOutcome::Full)
        }
    }

    async fn try_enroll(
        &self,
        thing: RecordId,
        user: RecordId,
    ) -> Result<Option<Class>, surrealdb::Error> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET enrolled += $user, updatedAt = $now
                WHERE array::len(enrolled) < capacity AND $user NOTINSIDE enrolled
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("user", user))
            .bind(("now", now_millis()))
            .await?;
        result.take(0)
    }

    /// Drop a member from the roster. Removing an absent member is a no-op.
    pub async fn unenroll(&self, class_id: &str, user: &RecordId) -> RepoResult<Class> {
        let thing = parse_record_id(class_id, "class")?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET enrolled -= $user, updatedAt = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("user", user.clone()))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Class>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Class {} not found", class_id)))
    }
}
