//! Domain events broadcast to connected observers.
//!
//! Every successful mutation produces exactly one event, published through
//! [`crate::broadcast::BroadcastHub`] after the storage commit succeeds,
//! never before. Payloads carry the minimal fields observers need to update
//! their view without re-querying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        id: i64,
        project: String,
        description: Option<String>,
        start_time: DateTime<Utc>,
    },
    TimerStopped {
        id: i64,
        duration_minutes: i64,
        end_time: DateTime<Utc>,
    },
    EntryCreated {
        id: i64,
        project: String,
        description: Option<String>,
        duration_minutes: i64,
    },
    EntryUpdated {
        id: i64,
        project: String,
        description: Option<String>,
        duration_minutes: i64,
    },
    EntryDeleted {
        id: i64,
    },
    ProjectCreated {
        id: i64,
        name: String,
        color: String,
    },
    ProjectUpdated {
        id: i64,
        name: String,
        color: String,
        old_name: String,
        updated_entries_count: usize,
    },
    ProjectDeactivated {
        id: i64,
    },
}
