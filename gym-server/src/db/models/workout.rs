//! Workout Plan Model
//!
//! 训练计划. A plan belongs to a member and optionally references the
//! trainer who wrote it. `completed_dates` appends a timestamp each time
//! the member finishes a session.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::types::{Difficulty, Weekday, WorkoutCategory};

use super::serde_helpers;

/// Workout ID type
pub type WorkoutId = RecordId;

/// Single exercise inside a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    /// Free text so ranges like "8-12" survive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Workout plan model matching the SurrealDB schema (stored camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<WorkoutId>,
    /// Record link to the member the plan is for
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    /// Record link to the authoring trainer, if any
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub trainer: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Weekday>,
    #[serde(default)]
    pub category: WorkoutCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(default = "serde_helpers::default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
    /// Completion timestamps (Unix millis), append-only
    #[serde(default)]
    pub completed_dates: Vec<i64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Workout {
    /// Record id as "workout:key" string (empty when unsaved)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }
}

/// Workout joined with the authoring trainer's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutWithTrainer {
    #[serde(flatten)]
    pub workout: Workout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
}

/// Create workout payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCreate {
    /// "user:key" string; defaults to the caller when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// "user:key" string; trainers are forced to self
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Weekday>,
    #[serde(default)]
    pub category: WorkoutCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
}

/// Update workout payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<Exercise>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<WorkoutCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workout_defaults_apply() {
        let workout: Workout = serde_json::from_value(serde_json::json!({
            "user": "user:m1",
            "name": "Push Day"
        }))
        .unwrap();
        assert!(workout.is_active);
        assert!(workout.trainer.is_none());
        assert_eq!(workout.category, WorkoutCategory::Mixed);
        assert!(workout.completed_dates.is_empty());
    }

    #[test]
    fn exercises_round_trip_with_free_text_reps() {
        let workout: Workout = serde_json::from_value(serde_json::json!({
            "user": "user:m1",
            "trainer": "user:t1",
            "name": "Full Body",
            "exercises": [
                { "name": "Squat", "sets": 5, "reps": "5", "rest": "3min" },
                { "name": "Pull-up", "reps": "8-12" }
            ]
        }))
        .unwrap();
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[1].reps.as_deref(), Some("8-12"));
        assert!(workout.exercises[1].sets.is_none());
        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(json["trainer"], "user:t1");
    }
}
