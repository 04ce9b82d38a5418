//! # Zeitlog Core Library
//!
//! This library provides the core business logic for Zeitlog, a project
//! time tracker: a single global timer, manual entries, project management
//! with rename cascades, live-update fan-out, and weekly aggregation. The
//! CLI binary (and any other API surface) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a storage-backed state machine (Idle/Running) that enforces
//!   the single-active-timer invariant under the database lock
//! - **Registry**: project create/rename/retire; a rename rewrites the
//!   denormalized project name on historical entries in one transaction
//! - **Broadcast**: best-effort event fan-out over bounded channels
//! - **Stats**: pure Monday-to-Sunday calendar-week aggregation
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerStateMachine`]: timer and entry mutations
//! - [`ProjectRegistry`]: project mutations and the rename cascade
//! - [`BroadcastHub`]: observer subscription and event delivery
//! - [`Database`]: record persistence
//! - [`Event`]: the domain events observers receive

pub mod broadcast;
pub mod error;
pub mod events;
pub mod export;
pub mod model;
pub mod registry;
pub mod stats;
pub mod storage;
pub mod timer;

pub use broadcast::{BroadcastHub, SubscriberId};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use model::{Project, TimeEntry, DEFAULT_PROJECT_COLOR};
pub use registry::{ProjectRegistry, RenameOutcome};
pub use stats::{aggregate, WeekReport, WeekWindow};
pub use storage::{Config, Database};
pub use timer::{TimerState, TimerStateMachine};
