//! End-to-end workflows across components: timer, registry, stats, export,
//! and the events observers see along the way.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use zeitlog_core::broadcast::BroadcastHub;
use zeitlog_core::events::Event;
use zeitlog_core::model::DEFAULT_PROJECT_COLOR;
use zeitlog_core::registry::ProjectRegistry;
use zeitlog_core::stats::{aggregate, WeekWindow};
use zeitlog_core::storage::Database;
use zeitlog_core::timer::TimerStateMachine;
use zeitlog_core::{export, TimerState};

struct World {
    db: Arc<Mutex<Database>>,
    hub: BroadcastHub,
    machine: TimerStateMachine,
    registry: ProjectRegistry,
}

fn world() -> World {
    let db = Arc::new(Mutex::new(Database::open_memory().unwrap()));
    let hub = BroadcastHub::new();
    World {
        machine: TimerStateMachine::new(db.clone(), hub.clone()),
        registry: ProjectRegistry::new(db.clone(), hub.clone()),
        db,
        hub,
    }
}

#[test]
fn track_rename_and_report_a_week() {
    let world = world();
    let (_sub, mut rx) = world.hub.subscribe();

    let alpha = world
        .registry
        .create("Alpha", DEFAULT_PROJECT_COLOR)
        .unwrap();

    // A timed session: 09:00 -> 09:45 on Wednesday of week 2, 2024.
    world
        .machine
        .start_at("Alpha", Some("design"), Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap())
        .unwrap();
    assert_eq!(world.machine.state().unwrap(), TimerState::Running);
    world
        .machine
        .stop_at(Utc.with_ymd_and_hms(2024, 1, 10, 9, 45, 0).unwrap())
        .unwrap();

    // Two manual sessions in the same week, one outside it.
    world
        .machine
        .record_manual("Alpha", None, "2024-01-11", "10:00:00", "11:00:00")
        .unwrap();
    world
        .machine
        .record_manual("Alpha", None, "2024-01-12", "10:00", "10:30")
        .unwrap();
    world
        .machine
        .record_manual("Alpha", None, "2024-02-01", "10:00", "12:00")
        .unwrap();

    // Rename cascades over all four entries.
    let outcome = world
        .registry
        .rename(alpha.id, "Beta", DEFAULT_PROJECT_COLOR)
        .unwrap();
    assert_eq!(outcome.updated_entries_count, 4);

    // Week 2 of 2024 sees only the three in-window sessions, under the new
    // name.
    let window = WeekWindow::for_iso_week(2024, 2).unwrap();
    let entries = {
        let db = world.db.lock().unwrap();
        db.entries_started_between(window.start, window.end).unwrap()
    };
    let report = aggregate(&entries, &window);
    assert_eq!(report.total_minutes, 45 + 60 + 30);
    assert_eq!(report.total_hours, 2.25);
    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.projects["Beta"], 135);

    // The observer saw every mutation, in commit order.
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(match event {
            Event::ProjectCreated { .. } => "project_created",
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerStopped { .. } => "timer_stopped",
            Event::EntryCreated { .. } => "entry_created",
            Event::ProjectUpdated { .. } => "project_updated",
            _ => "other",
        });
    }
    assert_eq!(
        kinds,
        vec![
            "project_created",
            "timer_started",
            "timer_stopped",
            "entry_created",
            "entry_created",
            "entry_created",
            "project_updated",
        ]
    );
}

#[test]
fn export_covers_only_completed_entries_in_range() {
    let world = world();

    world
        .machine
        .record_manual("Alpha", Some("a"), "2024-01-09", "09:00", "10:00")
        .unwrap();
    world
        .machine
        .record_manual("Alpha", Some("b"), "2024-01-10", "09:00", "10:00")
        .unwrap();
    world
        .machine
        .record_manual("Alpha", Some("c"), "2024-01-11", "09:00", "10:00")
        .unwrap();
    world.machine.start("Alpha", None).unwrap();

    let from = export::start_of_day(chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let to = export::end_of_day(chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let entries = {
        let db = world.db.lock().unwrap();
        db.export_entries(Some(from), Some(to)).unwrap()
    };
    let rows = export::rows(&entries);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "b");
    assert_eq!(rows[0].date, "2024-01-10");
    assert_eq!(rows[0].duration_minutes, 60);
}

#[test]
fn recent_entries_are_most_recent_first_and_bounded() {
    let world = world();
    for day in 10..15 {
        world
            .machine
            .record_manual("Alpha", None, &format!("2024-01-{day}"), "09:00", "10:00")
            .unwrap();
    }

    let db = world.db.lock().unwrap();
    let recent = db.recent_entries(3).unwrap();
    assert_eq!(recent.len(), 3);
    // Created last, listed first.
    assert!(recent[0].id > recent[1].id && recent[1].id > recent[2].id);
}

#[test]
fn state_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zeitlog.db");

    {
        let db = Arc::new(Mutex::new(Database::open_at(&path).unwrap()));
        let machine = TimerStateMachine::new(db, BroadcastHub::new());
        machine.start("Alpha", Some("design")).unwrap();
    }

    // A fresh handle sees the running timer and can stop it.
    let db = Arc::new(Mutex::new(Database::open_at(&path).unwrap()));
    let machine = TimerStateMachine::new(db, BroadcastHub::new());
    assert_eq!(machine.state().unwrap(), TimerState::Running);
    let entry = machine.stop().unwrap();
    assert_eq!(entry.project, "Alpha");
    assert!(!entry.is_running);
}

#[test]
fn deactivated_project_history_survives_into_reports() {
    let world = world();
    let alpha = world
        .registry
        .create("Alpha", DEFAULT_PROJECT_COLOR)
        .unwrap();
    world
        .machine
        .record_manual("Alpha", None, "2024-01-10", "09:00", "10:00")
        .unwrap();
    world.registry.deactivate(alpha.id).unwrap();

    let window = WeekWindow::for_iso_week(2024, 2).unwrap();
    let entries = {
        let db = world.db.lock().unwrap();
        db.entries_started_between(window.start, window.end).unwrap()
    };
    let report = aggregate(&entries, &window);
    assert_eq!(report.projects["Alpha"], 60);
}
