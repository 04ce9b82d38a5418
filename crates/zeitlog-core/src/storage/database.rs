//! SQLite-based storage for projects and time entries.
//!
//! This is the persistence gateway: every component reads and writes through
//! it, and multi-record operations (the rename cascade) run inside a single
//! `BEGIN IMMEDIATE` transaction so they are all-or-nothing.
//!
//! Timestamps are stored as RFC3339 text in UTC; range queries compare the
//! same fixed-width format lexicographically.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::model::{duration_minutes, Project, TimeEntry};

use super::data_dir;

/// SQLite database holding the two record collections.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at its configured default location
    /// (`~/.config/zeitlog/zeitlog.db`).
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("zeitlog.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests, ephemeral runs).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::Query)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                color      TEXT NOT NULL DEFAULT '#667eea',
                is_active  INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS time_entries (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                project          TEXT NOT NULL,
                description      TEXT,
                start_time       TEXT NOT NULL,
                end_time         TEXT,
                duration_minutes INTEGER,
                is_running       INTEGER NOT NULL DEFAULT 0,
                created_at       TEXT NOT NULL
            );

            -- Active-name uniqueness; inactive projects may share names.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_active_name
                ON projects(name) WHERE is_active = 1;

            CREATE INDEX IF NOT EXISTS idx_entries_start_time ON time_entries(start_time);
            CREATE INDEX IF NOT EXISTS idx_entries_is_running ON time_entries(is_running);
            CREATE INDEX IF NOT EXISTS idx_entries_project ON time_entries(project);",
        )?;
        Ok(())
    }

    // === Project CRUD ===

    /// Insert a new active project.
    pub fn create_project(&self, name: &str, color: &str) -> Result<Project, rusqlite::Error> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO projects (name, color, is_active, created_at)
             VALUES (?1, ?2, 1, ?3)",
            params![name, color, created_at.to_rfc3339()],
        )?;
        Ok(Project {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            color: color.to_string(),
            is_active: true,
            created_at,
        })
    }

    /// Get a project by id.
    pub fn get_project(&self, id: i64) -> Result<Option<Project>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, color, is_active, created_at FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .optional()
    }

    /// Find an active project by name.
    pub fn find_active_project(&self, name: &str) -> Result<Option<Project>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, color, is_active, created_at FROM projects
                 WHERE name = ?1 AND is_active = 1",
                params![name],
                row_to_project,
            )
            .optional()
    }

    /// List active projects in creation order.
    pub fn list_active_projects(&self) -> Result<Vec<Project>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, is_active, created_at FROM projects
             WHERE is_active = 1 ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_project)?;
        rows.collect()
    }

    /// Update a project's color without touching its name.
    pub fn update_project_color(&self, id: i64, color: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE projects SET color = ?1 WHERE id = ?2",
            params![color, id],
        )?;
        Ok(())
    }

    /// Rename a project and rewrite the name snapshot on every entry that
    /// references it, in a single transaction.
    ///
    /// Returns the number of entries rewritten. A failure partway leaves
    /// neither the project row nor any entry changed.
    pub fn rename_project_cascade(
        &self,
        id: i64,
        old_name: &str,
        new_name: &str,
        color: &str,
    ) -> Result<usize, rusqlite::Error> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<usize, rusqlite::Error> = (|| {
            self.conn.execute(
                "UPDATE projects SET name = ?1, color = ?2 WHERE id = ?3",
                params![new_name, color, id],
            )?;
            let updated = self.conn.execute(
                "UPDATE time_entries SET project = ?1 WHERE project = ?2",
                params![new_name, old_name],
            )?;
            Ok(updated)
        })();
        match result {
            Ok(updated) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(updated)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    /// Soft-delete a project. Historical entries are left untouched.
    ///
    /// Returns false when no row had that id.
    pub fn deactivate_project(&self, id: i64) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE projects SET is_active = 0 WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    // === Entry CRUD ===

    /// Insert a running entry (an active timer).
    pub fn insert_running_entry(
        &self,
        project: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
    ) -> Result<TimeEntry, rusqlite::Error> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO time_entries (project, description, start_time, is_running, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![
                project,
                description,
                start_time.to_rfc3339(),
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(TimeEntry {
            id: self.conn.last_insert_rowid(),
            project: project.to_string(),
            description: description.map(str::to_string),
            start_time,
            end_time: None,
            duration_minutes: None,
            is_running: true,
            created_at,
        })
    }

    /// Insert a completed (non-running) entry. Duration is derived from the
    /// given span, never supplied by the caller.
    pub fn insert_completed_entry(
        &self,
        project: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<TimeEntry, rusqlite::Error> {
        let created_at = Utc::now();
        let duration = duration_minutes(start_time, end_time);
        self.conn.execute(
            "INSERT INTO time_entries
                 (project, description, start_time, end_time, duration_minutes, is_running, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                project,
                description,
                start_time.to_rfc3339(),
                end_time.to_rfc3339(),
                duration,
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(TimeEntry {
            id: self.conn.last_insert_rowid(),
            project: project.to_string(),
            description: description.map(str::to_string),
            start_time,
            end_time: Some(end_time),
            duration_minutes: Some(duration),
            is_running: false,
            created_at,
        })
    }

    /// The single running entry, if a timer is active.
    pub fn running_entry(&self) -> Result<Option<TimeEntry>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, project, description, start_time, end_time,
                        duration_minutes, is_running, created_at
                 FROM time_entries WHERE is_running = 1",
                [],
                row_to_entry,
            )
            .optional()
    }

    /// Get an entry by id.
    pub fn get_entry(&self, id: i64) -> Result<Option<TimeEntry>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, project, description, start_time, end_time,
                        duration_minutes, is_running, created_at
                 FROM time_entries WHERE id = ?1",
                params![id],
                row_to_entry,
            )
            .optional()
    }

    /// Close out a running entry: set its end, derived duration, and clear
    /// the running flag.
    pub fn finish_entry(
        &self,
        id: i64,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE time_entries
             SET end_time = ?1, duration_minutes = ?2, is_running = 0
             WHERE id = ?3",
            params![end_time.to_rfc3339(), duration, id],
        )?;
        Ok(())
    }

    /// Rewrite a non-running entry's fields.
    pub fn update_entry(
        &self,
        id: i64,
        project: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE time_entries
             SET project = ?1, description = ?2, start_time = ?3,
                 end_time = ?4, duration_minutes = ?5
             WHERE id = ?6",
            params![
                project,
                description,
                start_time.to_rfc3339(),
                end_time.to_rfc3339(),
                duration,
                id,
            ],
        )?;
        Ok(())
    }

    /// Permanently remove an entry.
    pub fn delete_entry(&self, id: i64) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM time_entries WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Queries ===

    /// Most recently created entries first.
    pub fn recent_entries(&self, limit: u32) -> Result<Vec<TimeEntry>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project, description, start_time, end_time,
                    duration_minutes, is_running, created_at
             FROM time_entries ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_entry)?;
        rows.collect()
    }

    /// Non-running entries whose start falls inside the closed range.
    pub fn entries_started_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project, description, start_time, end_time,
                    duration_minutes, is_running, created_at
             FROM time_entries
             WHERE is_running = 0 AND start_time >= ?1 AND start_time <= ?2
             ORDER BY start_time",
        )?;
        let rows = stmt.query_map(params![start.to_rfc3339(), end.to_rfc3339()], row_to_entry)?;
        rows.collect()
    }

    /// Non-running entries for export, optionally bounded, most recent
    /// start first.
    pub fn export_entries(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeEntry>, rusqlite::Error> {
        let mut sql = String::from(
            "SELECT id, project, description, start_time, end_time,
                    duration_minutes, is_running, created_at
             FROM time_entries WHERE is_running = 0",
        );
        let mut bounds: Vec<String> = Vec::new();
        if let Some(from) = from {
            bounds.push(from.to_rfc3339());
            sql.push_str(&format!(" AND start_time >= ?{}", bounds.len()));
        }
        if let Some(to) = to {
            bounds.push(to.to_rfc3339());
            sql.push_str(&format!(" AND start_time <= ?{}", bounds.len()));
        }
        sql.push_str(" ORDER BY start_time DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bounds.iter()), row_to_entry)?;
        rows.collect()
    }
}

fn row_to_project(row: &rusqlite::Row) -> Result<Project, rusqlite::Error> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        is_active: row.get::<_, i64>(3)? != 0,
        created_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

fn row_to_entry(row: &rusqlite::Row) -> Result<TimeEntry, rusqlite::Error> {
    let end_time = row
        .get::<_, Option<String>>(4)?
        .map(|s| parse_timestamp(4, &s))
        .transpose()?;
    Ok(TimeEntry {
        id: row.get(0)?,
        project: row.get(1)?,
        description: row.get(2)?,
        start_time: parse_timestamp(3, &row.get::<_, String>(3)?)?,
        end_time,
        duration_minutes: row.get(5)?,
        is_running: row.get::<_, i64>(6)? != 0,
        created_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
    })
}

fn parse_timestamp(column: usize, text: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, e.into())
        })
}
