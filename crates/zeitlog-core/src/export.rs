//! Export rows for completed entries.
//!
//! Produces the ordered row sequence only; encoding into a transport format
//! (CSV text, download headers) is the caller's job.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TimeEntry;

/// One exportable entry, with clocks and date pre-formatted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    pub project: String,
    pub description: String,
    /// `%H:%M:%S`
    pub start_clock: String,
    /// `%H:%M:%S`
    pub end_clock: String,
    pub duration_minutes: i64,
    /// `%Y-%m-%d`, taken from the entry's start.
    pub date: String,
}

/// Convert entries into export rows, preserving the given order and
/// skipping anything still running.
pub fn rows(entries: &[TimeEntry]) -> Vec<ExportRow> {
    entries
        .iter()
        .filter(|entry| !entry.is_running)
        .map(|entry| ExportRow {
            project: entry.project.clone(),
            description: entry.description.clone().unwrap_or_default(),
            start_clock: entry.start_time.format("%H:%M:%S").to_string(),
            end_clock: entry
                .end_time
                .map(|end| end.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            duration_minutes: entry.duration_minutes.unwrap_or(0),
            date: entry.start_time.format("%Y-%m-%d").to_string(),
        })
        .collect()
}

/// Start-of-day bound for a date-limited export.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Inclusive end-of-day bound for a date-limited export.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_format_clocks_and_date_from_start() {
        let entry = TimeEntry {
            id: 1,
            project: "Alpha".to_string(),
            description: Some("design".to_string()),
            start_time: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2024, 1, 10, 9, 45, 30).unwrap()),
            duration_minutes: Some(45),
            is_running: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        };

        let rows = rows(&[entry]);
        assert_eq!(
            rows[0],
            ExportRow {
                project: "Alpha".to_string(),
                description: "design".to_string(),
                start_clock: "09:00:00".to_string(),
                end_clock: "09:45:30".to_string(),
                duration_minutes: 45,
                date: "2024-01-10".to_string(),
            }
        );
    }

    #[test]
    fn running_entries_are_skipped() {
        let entry = TimeEntry {
            id: 1,
            project: "Alpha".to_string(),
            description: None,
            start_time: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            end_time: None,
            duration_minutes: None,
            is_running: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        };
        assert!(rows(&[entry]).is_empty());
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            start_of_day(date),
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            end_of_day(date),
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap()
        );
    }
}
