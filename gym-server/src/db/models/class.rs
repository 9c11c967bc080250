//! Class Model
//!
//! 课程模型. A class holds a record link to its trainer and an `enrolled`
//! array of member record links. Capacity is enforced in the enrollment
//! query, not here; `available_spots` is display-only.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::types::{ClassCategory, Difficulty, Weekday};

use super::serde_helpers;

/// Class ID type
pub type ClassId = RecordId;

/// Weekly schedule slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchedule {
    pub day_of_week: Weekday,
    /// "HH:MM" 24h
    pub start_time: String,
    /// "HH:MM" 24h
    pub end_time: String,
}

/// Class model matching the SurrealDB schema (stored camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ClassId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Record link to the trainer user
    #[serde(with = "serde_helpers::record_id")]
    pub trainer: RecordId,
    pub schedule: ClassSchedule,
    pub capacity: u32,
    /// Record links to enrolled member users
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub enrolled: Vec<RecordId>,
    #[serde(default)]
    pub category: ClassCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    #[serde(default = "serde_helpers::default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Class {
    /// Remaining seats (never negative)
    pub fn available_spots(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled.len() as u32)
    }

    /// Record id as "class:key" string (empty when unsaved)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }
}

/// Class joined with its trainer's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassWithTrainer {
    #[serde(flatten)]
    pub class: Class,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
}

/// Roster entry: the public subset of an enrolled member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(with = "serde_helpers::record_id")]
    pub id: RecordId,
    pub full_name: String,
    pub email: String,
}

/// Create class payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "user:key" string; admins must supply it, trainers are forced to self
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    pub schedule: ClassSchedule,
    pub capacity: u32,
    #[serde(default)]
    pub category: ClassCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Update class payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ClassSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ClassCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_spots_saturates() {
        let class: Class = serde_json::from_value(serde_json::json!({
            "name": "Morning Yoga",
            "trainer": "user:t1",
            "schedule": { "dayOfWeek": "Monday", "startTime": "07:00", "endTime": "08:00" },
            "capacity": 2,
            "enrolled": ["user:a", "user:b", "user:c"],
            "durationMinutes": 60
        }))
        .unwrap();
        assert_eq!(class.available_spots(), 0);
        assert!(class.is_active);
        assert_eq!(class.category, ClassCategory::Other);
    }

    #[test]
    fn class_serializes_record_links_as_strings() {
        let class: Class = serde_json::from_value(serde_json::json!({
            "name": "Spin",
            "trainer": "user:t9",
            "schedule": { "dayOfWeek": "Friday", "startTime": "18:00", "endTime": "18:45" },
            "capacity": 20,
            "enrolled": ["user:m1"],
            "durationMinutes": 45
        }))
        .unwrap();
        let json = serde_json::to_value(&class).unwrap();
        assert_eq!(json["trainer"], "user:t9");
        assert_eq!(json["enrolled"][0], "user:m1");
        assert_eq!(json["schedule"]["dayOfWeek"], "Friday");
    }
}
