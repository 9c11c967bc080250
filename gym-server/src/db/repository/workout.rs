//! Workout Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Workout, WorkoutCreate, WorkoutUpdate, WorkoutWithTrainer};

#[derive(Clone)]
pub struct WorkoutRepository {
    base: BaseRepository,
}

impl WorkoutRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// A member's workout plans with trainer names, newest first
    pub async fn find_by_user(&self, user: RecordId) -> RepoResult<Vec<WorkoutWithTrainer>> {
        let workouts: Vec<WorkoutWithTrainer> = self
            .base
            .db()
            .query(
                r#"SELECT *, trainer.fullName AS trainerName FROM workout
                WHERE user = $user ORDER BY createdAt DESC"#,
            )
            .bind(("user", user))
            .await?
            .take(0)?;
        Ok(workouts)
    }

    /// Find workout by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Workout>> {
        let thing = parse_record_id(id, "workout")?;
        let workout: Option<Workout> = self.base.db().select(thing).await?;
        Ok(workout)
    }

    /// Create a plan; `user` and `trainer` are resolved by the caller
    pub async fn create(
        &self,
        user: RecordId,
        trainer: Option<RecordId>,
        data: WorkoutCreate,
    ) -> RepoResult<Workout> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE workout SET
                    user = $user,
                    trainer = $trainer,
                    name = $name,
                    description = $description,
                    exercises = $exercises,
                    dayOfWeek = $day_of_week,
                    category = $category,
                    difficulty = $difficulty,
                    estimatedDuration = $estimated_duration,
                    isActive = true,
                    completedDates = [],
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("user", user))
            .bind(("trainer", trainer))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("exercises", data.exercises))
            .bind(("day_of_week", data.day_of_week))
            .bind(("category", data.category))
            .bind(("difficulty", data.difficulty))
            .bind(("estimated_duration", data.estimated_duration))
            .bind(("now", now))
            .await?;

        let created: Option<Workout> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create workout".to_string()))
    }

    /// Update a plan
    pub async fn update(&self, id: &str, data: WorkoutUpdate) -> RepoResult<Workout> {
        let thing = parse_record_id(id, "workout")?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    description = $description OR description,
                    exercises = IF $has_exercises THEN $exercises ELSE exercises END,
                    dayOfWeek = IF $has_day_of_week THEN $day_of_week ELSE dayOfWeek END,
                    category = IF $has_category THEN $category ELSE category END,
                    difficulty = IF $has_difficulty THEN $difficulty ELSE difficulty END,
                    estimatedDuration = IF $has_duration THEN $duration ELSE estimatedDuration END,
                    isActive = IF $has_is_active THEN $is_active ELSE isActive END,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("has_exercises", data.exercises.is_some()))
            .bind(("exercises", data.exercises))
            .bind(("has_day_of_week", data.day_of_week.is_some()))
            .bind(("day_of_week", data.day_of_week))
            .bind(("has_category", data.category.is_some()))
            .bind(("category", data.category))
            .bind(("has_difficulty", data.difficulty.is_some()))
            .bind(("difficulty", data.difficulty))
            .bind(("has_duration", data.estimated_duration.is_some()))
            .bind(("duration", data.estimated_duration))
            .bind(("has_is_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Workout>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Workout {} not found", id)))
    }

    /// Append a completion timestamp
    pub async fn complete(&self, id: &str) -> RepoResult<Workout> {
        let thing = parse_record_id(id, "workout")?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET completedDates += $now, updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Workout>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Workout {} not found", id)))
    }
}
