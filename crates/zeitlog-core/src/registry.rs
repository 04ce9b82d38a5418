//! Project registry: create, rename, retire.
//!
//! Owns the uniqueness invariant on active project names and the rename
//! cascade. Renaming rewrites the denormalized `project` snapshot on every
//! historical entry in one storage transaction; retiring a project is a soft
//! delete that leaves history untouched.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::broadcast::BroadcastHub;
use crate::error::CoreError;
use crate::events::Event;
use crate::model::Project;
use crate::storage::Database;

/// Outcome of a rename, including how many entries the cascade touched.
#[derive(Debug, Clone)]
pub struct RenameOutcome {
    pub project: Project,
    pub old_name: String,
    pub updated_entries_count: usize,
}

#[derive(Clone)]
pub struct ProjectRegistry {
    db: Arc<Mutex<Database>>,
    hub: BroadcastHub,
}

impl ProjectRegistry {
    pub fn new(db: Arc<Mutex<Database>>, hub: BroadcastHub) -> Self {
        Self { db, hub }
    }

    /// Create a new active project. Fails with `DuplicateName` if an active
    /// project already has this name.
    pub fn create(&self, name: &str, color: &str) -> Result<Project, CoreError> {
        let project = {
            let db = self.lock_db();
            if db.find_active_project(name)?.is_some() {
                return Err(CoreError::DuplicateName(name.to_string()));
            }
            db.create_project(name, color)?
        };
        self.hub.broadcast(&Event::ProjectCreated {
            id: project.id,
            name: project.name.clone(),
            color: project.color.clone(),
        });
        Ok(project)
    }

    /// Rename a project and update its color.
    ///
    /// When the name actually changes, the project row and every entry
    /// referencing the old name are rewritten atomically. Renaming to the
    /// current name is a no-op cascade and reports zero updated entries.
    pub fn rename(
        &self,
        project_id: i64,
        new_name: &str,
        color: &str,
    ) -> Result<RenameOutcome, CoreError> {
        let outcome = {
            let db = self.lock_db();
            let project = db.get_project(project_id)?.ok_or(CoreError::NotFound {
                kind: "project",
                id: project_id,
            })?;
            if let Some(existing) = db.find_active_project(new_name)? {
                if existing.id != project_id {
                    return Err(CoreError::DuplicateName(new_name.to_string()));
                }
            }

            let old_name = project.name.clone();
            let updated_entries_count = if old_name == new_name {
                db.update_project_color(project_id, color)?;
                0
            } else {
                db.rename_project_cascade(project_id, &old_name, new_name, color)?
            };

            RenameOutcome {
                project: Project {
                    name: new_name.to_string(),
                    color: color.to_string(),
                    ..project
                },
                old_name,
                updated_entries_count,
            }
        };
        self.hub.broadcast(&Event::ProjectUpdated {
            id: outcome.project.id,
            name: outcome.project.name.clone(),
            color: outcome.project.color.clone(),
            old_name: outcome.old_name.clone(),
            updated_entries_count: outcome.updated_entries_count,
        });
        Ok(outcome)
    }

    /// Retire a project. Fails with `NotFound`; never touches entries.
    pub fn deactivate(&self, project_id: i64) -> Result<(), CoreError> {
        {
            let db = self.lock_db();
            if !db.deactivate_project(project_id)? {
                return Err(CoreError::NotFound {
                    kind: "project",
                    id: project_id,
                });
            }
        }
        self.hub
            .broadcast(&Event::ProjectDeactivated { id: project_id });
        Ok(())
    }

    /// Active projects only, in creation order.
    pub fn list_active(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.lock_db().list_active_projects()?)
    }

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_PROJECT_COLOR;
    use chrono::{TimeZone, Utc};

    fn registry() -> (ProjectRegistry, Arc<Mutex<Database>>, BroadcastHub) {
        let db = Arc::new(Mutex::new(Database::open_memory().unwrap()));
        let hub = BroadcastHub::new();
        (ProjectRegistry::new(db.clone(), hub.clone()), db, hub)
    }

    #[test]
    fn duplicate_active_name_is_rejected() {
        let (registry, _db, _hub) = registry();
        registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        let err = registry.create("Alpha", "#000000").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateName(name) if name == "Alpha"));
    }

    #[test]
    fn name_is_reusable_after_deactivation() {
        let (registry, _db, _hub) = registry();
        let project = registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        registry.deactivate(project.id).unwrap();
        assert!(registry.create("Alpha", DEFAULT_PROJECT_COLOR).is_ok());
    }

    #[test]
    fn rename_cascades_to_every_matching_entry() {
        let (registry, db, _hub) = registry();
        let project = registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        {
            let db = db.lock().unwrap();
            let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();
            for _ in 0..3 {
                db.insert_completed_entry("Alpha", None, start, end).unwrap();
            }
            db.insert_completed_entry("Unrelated", None, start, end)
                .unwrap();
        }

        let outcome = registry
            .rename(project.id, "Beta", DEFAULT_PROJECT_COLOR)
            .unwrap();
        assert_eq!(outcome.updated_entries_count, 3);
        assert_eq!(outcome.old_name, "Alpha");
        assert_eq!(outcome.project.name, "Beta");

        let db = db.lock().unwrap();
        let entries = db.recent_entries(10).unwrap();
        assert!(entries
            .iter()
            .all(|e| e.project == "Beta" || e.project == "Unrelated"));
    }

    #[test]
    fn rename_to_own_name_is_a_noop_cascade() {
        let (registry, db, _hub) = registry();
        let project = registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        {
            let db = db.lock().unwrap();
            let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();
            db.insert_completed_entry("Alpha", None, start, end).unwrap();
        }

        let outcome = registry.rename(project.id, "Alpha", "#112233").unwrap();
        assert_eq!(outcome.updated_entries_count, 0);
        // Color still updates on a same-name rename.
        assert_eq!(registry.list_active().unwrap()[0].color, "#112233");
    }

    #[test]
    fn rename_to_another_active_name_is_rejected() {
        let (registry, _db, _hub) = registry();
        registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        let beta = registry.create("Beta", DEFAULT_PROJECT_COLOR).unwrap();
        let err = registry
            .rename(beta.id, "Alpha", DEFAULT_PROJECT_COLOR)
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateName(_)));
    }

    #[test]
    fn deactivate_hides_project_but_keeps_entries() {
        let (registry, db, _hub) = registry();
        let project = registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        {
            let db = db.lock().unwrap();
            let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();
            db.insert_completed_entry("Alpha", None, start, end).unwrap();
        }

        registry.deactivate(project.id).unwrap();
        assert!(registry.list_active().unwrap().is_empty());

        let db = db.lock().unwrap();
        let entries = db.recent_entries(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project, "Alpha");
    }

    #[test]
    fn unknown_project_reports_not_found() {
        let (registry, _db, _hub) = registry();
        assert!(matches!(
            registry.deactivate(42).unwrap_err(),
            CoreError::NotFound { kind: "project", .. }
        ));
        assert!(matches!(
            registry.rename(42, "X", "#000000").unwrap_err(),
            CoreError::NotFound { kind: "project", .. }
        ));
    }

    #[test]
    fn registry_mutations_broadcast_events() {
        let (registry, _db, hub) = registry();
        let (_id, mut rx) = hub.subscribe();

        let project = registry.create("Alpha", DEFAULT_PROJECT_COLOR).unwrap();
        assert!(matches!(rx.try_recv().unwrap(), Event::ProjectCreated { .. }));

        registry
            .rename(project.id, "Beta", DEFAULT_PROJECT_COLOR)
            .unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::ProjectUpdated { updated_entries_count: 0, .. }
        ));

        registry.deactivate(project.id).unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::ProjectDeactivated { id } if id == project.id
        ));
    }
}
