//! Calendar-week aggregation.
//!
//! Weeks run Monday 00:00:00 through Sunday 23:59:59. Week 1 of a year is
//! the week containing January 4th, so week *w* starts at
//! `monday(Jan 4) + 7 * (w - 1)` days. Aggregation is a pure computation
//! over a slice of entries; running entries have no duration and are always
//! excluded.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::TimeEntry;

/// A closed Monday-to-Sunday window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekWindow {
    /// Window for calendar week `week` of `year`, via the Jan-4 anchor rule.
    pub fn for_iso_week(year: i32, week: u32) -> Result<Self, CoreError> {
        let jan_4 = NaiveDate::from_ymd_opt(year, 1, 4)
            .ok_or_else(|| CoreError::InvalidFormat(format!("bad year {year}")))?;
        let week_1_monday = jan_4 - Duration::days(jan_4.weekday().num_days_from_monday() as i64);
        let monday = week_1_monday
            .checked_add_signed(Duration::weeks(week as i64 - 1))
            // The whole Monday-to-Sunday window must stay representable.
            .filter(|monday| monday.checked_add_signed(Duration::days(7)).is_some())
            .ok_or_else(|| CoreError::InvalidFormat(format!("bad week {week}")))?;
        Ok(Self::starting(monday))
    }

    /// Window of the week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self::starting(monday)
    }

    /// Window of the week containing today.
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    fn starting(monday: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN));
        let end = start + Duration::days(6) + Duration::hours(23) + Duration::minutes(59)
            + Duration::seconds(59);
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Per-week totals: overall and per project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_minutes: i64,
    /// `total_minutes / 60`, rounded to 2 decimal places.
    pub total_hours: f64,
    pub projects: BTreeMap<String, i64>,
}

/// Sum durations of the entries whose `start_time` falls inside `window`.
///
/// Running entries are skipped; a missing duration counts as zero;
/// duplicates are summed, never deduplicated.
pub fn aggregate(entries: &[TimeEntry], window: &WeekWindow) -> WeekReport {
    let mut total_minutes = 0;
    let mut projects: BTreeMap<String, i64> = BTreeMap::new();

    for entry in entries {
        if entry.is_running || !window.contains(entry.start_time) {
            continue;
        }
        let minutes = entry.duration_minutes.unwrap_or(0);
        total_minutes += minutes;
        *projects.entry(entry.project.clone()).or_insert(0) += minutes;
    }

    WeekReport {
        start: window.start,
        end: window.end,
        total_minutes,
        total_hours: (total_minutes as f64 / 60.0 * 100.0).round() / 100.0,
        projects,
    }
}
