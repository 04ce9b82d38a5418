use clap::Subcommand;

#[derive(Subcommand)]
pub enum EntryAction {
    /// Record a completed entry manually
    Add {
        /// Project name
        project: String,
        /// What was worked on
        #[arg(long)]
        description: Option<String>,
        /// Day of the entry (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Start clock (HH:MM or HH:MM:SS)
        #[arg(long)]
        start: String,
        /// End clock (HH:MM or HH:MM:SS)
        #[arg(long)]
        end: String,
    },
    /// Edit a non-running entry (times are always rewritten)
    Edit {
        /// Entry id
        id: i64,
        /// New project name, unchanged when omitted
        #[arg(long)]
        project: Option<String>,
        /// New description, unchanged when omitted
        #[arg(long)]
        description: Option<String>,
        /// Day of the entry (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Start clock (HH:MM or HH:MM:SS)
        #[arg(long)]
        start: String,
        /// End clock (HH:MM or HH:MM:SS)
        #[arg(long)]
        end: String,
    },
    /// Delete a non-running entry
    Delete {
        /// Entry id
        id: i64,
    },
    /// List recent entries, most recent first
    List {
        /// Override the configured limit
        #[arg(long)]
        limit: Option<u32>,
    },
}

pub fn run(action: EntryAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::context()?;

    match action {
        EntryAction::Add {
            project,
            description,
            date,
            start,
            end,
        } => {
            let entry =
                ctx.machine
                    .record_manual(&project, description.as_deref(), &date, &start, &end)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        EntryAction::Edit {
            id,
            project,
            description,
            date,
            start,
            end,
        } => {
            let entry = ctx.machine.edit(
                id,
                project.as_deref(),
                description.as_deref(),
                &date,
                &start,
                &end,
            )?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        EntryAction::Delete { id } => {
            ctx.machine.delete(id)?;
            println!("deleted entry {id}");
        }
        EntryAction::List { limit } => {
            let limit = limit.unwrap_or(ctx.config.entries.recent_limit);
            let entries = {
                let db = ctx.db.lock().unwrap_or_else(|p| p.into_inner());
                db.recent_entries(limit)?
            };
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
