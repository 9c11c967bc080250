//! Attendance Model
//!
//! 出勤记录. One record per visit; check-out fills `check_out_time` and the
//! derived `duration_minutes`. Duration is computed in Rust so it stays an
//! integer regardless of how the storage engine divides.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::util::MINUTE_MS;

use super::serde_helpers;

/// Attendance ID type
pub type AttendanceId = RecordId;

/// Attendance model matching the SurrealDB schema (stored camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AttendanceId>,
    /// Record link to the visiting user
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    /// Optional record link to the class the visit was for
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub class: Option<RecordId>,
    /// Check-in time (Unix millis)
    pub check_in_time: i64,
    /// Check-out time (Unix millis), absent while still inside
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<i64>,
    /// Whole minutes between check-in and check-out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Attendance {
    /// Record id as "attendance:key" string (empty when unsaved)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }
}

/// Whole minutes between two millisecond timestamps, floored
pub fn duration_minutes(check_in: i64, check_out: i64) -> i64 {
    (check_out - check_in).div_euclid(MINUTE_MS)
}

/// Attendance joined with the class name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWithClass {
    #[serde(flatten)]
    pub attendance: Attendance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Attendance joined with both the user and class names (staff listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDetail {
    #[serde(flatten)]
    pub attendance: Attendance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Check-in payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Optional "class:key" string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_floors_partial_minutes() {
        assert_eq!(duration_minutes(0, 59_999), 0);
        assert_eq!(duration_minutes(0, 60_000), 1);
        assert_eq!(duration_minutes(1_000, 5_401_000), 90);
    }

    #[test]
    fn open_visit_omits_checkout_fields() {
        let visit: Attendance = serde_json::from_value(serde_json::json!({
            "user": "user:m1",
            "checkInTime": 1_700_000_000_000_i64
        }))
        .unwrap();
        let json = serde_json::to_value(&visit).unwrap();
        assert!(json.get("checkOutTime").is_none());
        assert!(json.get("durationMinutes").is_none());
        assert_eq!(json["user"], "user:m1");
    }
}
