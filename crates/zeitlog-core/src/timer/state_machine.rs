//! Timer state machine.
//!
//! Owns the global single-active-timer invariant: at most one running entry
//! exists across the whole system at any instant.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> start -> Running -> stop -> Idle
//! ```
//!
//! The state is derived from storage (a running entry exists or it doesn't),
//! and every check-then-act sequence runs while holding the database lock,
//! so two concurrent `start` calls can never both observe Idle. Events are
//! broadcast only after the storage write succeeds, and outside the lock.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::broadcast::BroadcastHub;
use crate::error::CoreError;
use crate::events::Event;
use crate::model::{duration_minutes, TimeEntry};
use crate::storage::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Timer and entry mutations, serialized through the database lock.
#[derive(Clone)]
pub struct TimerStateMachine {
    db: Arc<Mutex<Database>>,
    hub: BroadcastHub,
}

impl TimerStateMachine {
    pub fn new(db: Arc<Mutex<Database>>, hub: BroadcastHub) -> Self {
        Self { db, hub }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> Result<TimerState, CoreError> {
        match self.lock_db().running_entry()? {
            Some(_) => Ok(TimerState::Running),
            None => Ok(TimerState::Idle),
        }
    }

    /// The currently running entry, if any.
    pub fn running(&self) -> Result<Option<TimeEntry>, CoreError> {
        Ok(self.lock_db().running_entry()?)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a timer now. Fails with `AlreadyRunning` unless Idle.
    pub fn start(&self, project: &str, description: Option<&str>) -> Result<TimeEntry, CoreError> {
        self.start_at(project, description, Utc::now())
    }

    /// Start a timer at an explicit instant.
    pub fn start_at(
        &self,
        project: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TimeEntry, CoreError> {
        let entry = {
            let db = self.lock_db();
            if db.running_entry()?.is_some() {
                return Err(CoreError::AlreadyRunning);
            }
            db.insert_running_entry(project, description, now)?
        };
        self.hub.broadcast(&Event::TimerStarted {
            id: entry.id,
            project: entry.project.clone(),
            description: entry.description.clone(),
            start_time: entry.start_time,
        });
        Ok(entry)
    }

    /// Stop the running timer now. Fails with `NoActiveTimer` unless Running.
    pub fn stop(&self) -> Result<TimeEntry, CoreError> {
        self.stop_at(Utc::now())
    }

    /// Stop the running timer at an explicit instant.
    pub fn stop_at(&self, now: DateTime<Utc>) -> Result<TimeEntry, CoreError> {
        let entry = {
            let db = self.lock_db();
            let mut entry = db.running_entry()?.ok_or(CoreError::NoActiveTimer)?;
            // Clamped so a backwards wall-clock step cannot persist a
            // negative duration.
            let duration = duration_minutes(entry.start_time, now).max(0);
            db.finish_entry(entry.id, now, duration)?;
            entry.end_time = Some(now);
            entry.duration_minutes = Some(duration);
            entry.is_running = false;
            entry
        };
        self.hub.broadcast(&Event::TimerStopped {
            id: entry.id,
            duration_minutes: entry.duration_minutes.unwrap_or(0),
            end_time: now,
        });
        Ok(entry)
    }

    /// Record a completed entry directly, independent of timer state.
    pub fn record_manual(
        &self,
        project: &str,
        description: Option<&str>,
        date: &str,
        start_clock: &str,
        end_clock: &str,
    ) -> Result<TimeEntry, CoreError> {
        let (start_time, end_time) = parse_span(date, start_clock, end_clock)?;
        let entry = self
            .lock_db()
            .insert_completed_entry(project, description, start_time, end_time)?;
        self.hub.broadcast(&Event::EntryCreated {
            id: entry.id,
            project: entry.project.clone(),
            description: entry.description.clone(),
            duration_minutes: entry.duration_minutes.unwrap_or(0),
        });
        Ok(entry)
    }

    /// Edit a non-running entry. Time fields are always recomputed from the
    /// supplied date and clocks; project and description change only when
    /// given.
    pub fn edit(
        &self,
        entry_id: i64,
        project: Option<&str>,
        description: Option<&str>,
        date: &str,
        start_clock: &str,
        end_clock: &str,
    ) -> Result<TimeEntry, CoreError> {
        let (start_time, end_time) = parse_span(date, start_clock, end_clock)?;
        let entry = {
            let db = self.lock_db();
            let mut entry = db.get_entry(entry_id)?.ok_or(CoreError::NotFound {
                kind: "entry",
                id: entry_id,
            })?;
            if entry.is_running {
                return Err(CoreError::EntryRunning(entry_id));
            }
            if let Some(project) = project {
                entry.project = project.to_string();
            }
            if let Some(description) = description {
                entry.description = Some(description.to_string());
            }
            let duration = duration_minutes(start_time, end_time);
            db.update_entry(
                entry_id,
                &entry.project,
                entry.description.as_deref(),
                start_time,
                end_time,
                duration,
            )?;
            entry.start_time = start_time;
            entry.end_time = Some(end_time);
            entry.duration_minutes = Some(duration);
            entry
        };
        self.hub.broadcast(&Event::EntryUpdated {
            id: entry.id,
            project: entry.project.clone(),
            description: entry.description.clone(),
            duration_minutes: entry.duration_minutes.unwrap_or(0),
        });
        Ok(entry)
    }

    /// Permanently delete a non-running entry.
    pub fn delete(&self, entry_id: i64) -> Result<(), CoreError> {
        {
            let db = self.lock_db();
            let entry = db.get_entry(entry_id)?.ok_or(CoreError::NotFound {
                kind: "entry",
                id: entry_id,
            })?;
            if entry.is_running {
                return Err(CoreError::EntryRunning(entry_id));
            }
            db.delete_entry(entry_id)?;
        }
        self.hub.broadcast(&Event::EntryDeleted { id: entry_id });
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        // Each SQLite statement commits or fails on its own; a panic in a
        // previous holder cannot leave half-applied state behind.
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Combine a date with two clock values into a validated start/end span.
fn parse_span(
    date: &str,
    start_clock: &str,
    end_clock: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), CoreError> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidFormat(format!("bad date '{date}'")))?;
    let start = Utc.from_utc_datetime(&day.and_time(parse_clock(start_clock)?));
    let end = Utc.from_utc_datetime(&day.and_time(parse_clock(end_clock)?));
    if end <= start {
        return Err(CoreError::InvalidTimeRange { start, end });
    }
    Ok((start, end))
}

fn parse_clock(clock: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(clock, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .map_err(|_| CoreError::InvalidFormat(format!("bad clock value '{clock}'")))
}
