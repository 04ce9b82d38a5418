pub mod config;
pub mod entry;
pub mod export;
pub mod project;
pub mod stats;
pub mod timer;

use std::sync::{Arc, Mutex};

use zeitlog_core::broadcast::BroadcastHub;
use zeitlog_core::registry::ProjectRegistry;
use zeitlog_core::storage::{Config, Database};
use zeitlog_core::timer::TimerStateMachine;

/// Shared handles for one CLI invocation.
pub struct Context {
    pub config: Config,
    pub db: Arc<Mutex<Database>>,
    pub machine: TimerStateMachine,
    pub registry: ProjectRegistry,
}

/// Open the configured database and wire up the core components.
///
/// The hub has no subscribers in a one-shot CLI process; events still flow
/// through it so the mutation path matches a long-lived server's.
pub fn context() -> Result<Context, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let path = config.database_path()?;
    log::debug!("opening database at {}", path.display());

    let db = Arc::new(Mutex::new(Database::open_at(&path)?));
    let hub = BroadcastHub::new();
    Ok(Context {
        config,
        machine: TimerStateMachine::new(db.clone(), hub.clone()),
        registry: ProjectRegistry::new(db.clone(), hub),
        db,
    })
}
