//! Domain records: projects and time entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display color assigned to projects created without an explicit one.
pub const DEFAULT_PROJECT_COLOR: &str = "#667eea";

/// A named project that time entries are booked against.
///
/// Deactivation is a soft delete: the row stays so that historical entries
/// keep a valid reference, but the project is no longer selectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Unique among active projects.
    pub name: String,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A single tracked span of work.
///
/// `project` is a denormalized name snapshot, not a foreign key: a project
/// rename rewrites this field on every matching entry in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i64,
    pub project: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Present iff the entry is not running.
    pub end_time: Option<DateTime<Utc>>,
    /// Present iff the entry is not running; always `duration_minutes(start, end)`.
    pub duration_minutes: Option<i64>,
    pub is_running: bool,
    pub created_at: DateTime<Utc>,
}

/// Elapsed whole minutes between two instants, floored.
///
/// This is the single duration rule: `floor(elapsed_seconds / 60)`.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds() / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_floors_partial_minutes() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 10, 9, 45, 59).unwrap();
        assert_eq!(duration_minutes(start, end), 45);
    }

    #[test]
    fn duration_of_exact_minute() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 10, 9, 1, 0).unwrap();
        assert_eq!(duration_minutes(start, end), 1);
    }

    #[test]
    fn duration_under_a_minute_is_zero() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 59).unwrap();
        assert_eq!(duration_minutes(start, end), 0);
    }
}
