use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name (unique among active projects)
        name: String,
        /// Display color, e.g. "#667eea"
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a project, rewriting its historical entries
    Rename {
        /// Project id
        id: i64,
        /// New name
        name: String,
        /// Display color, kept when omitted
        #[arg(long)]
        color: Option<String>,
    },
    /// Retire a project (soft delete; history stays)
    Deactivate {
        /// Project id
        id: i64,
    },
    /// List active projects
    List,
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::context()?;

    match action {
        ProjectAction::Create { name, color } => {
            let color = color.unwrap_or_else(|| ctx.config.projects.default_color.clone());
            let project = ctx.registry.create(&name, &color)?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::Rename { id, name, color } => {
            let color = match color {
                Some(color) => color,
                None => {
                    let db = ctx.db.lock().unwrap_or_else(|p| p.into_inner());
                    db.get_project(id)?
                        .map(|p| p.color)
                        .unwrap_or_else(|| ctx.config.projects.default_color.clone())
                }
            };
            let outcome = ctx.registry.rename(id, &name, &color)?;
            println!("{}", serde_json::to_string_pretty(&outcome.project)?);
            log::info!(
                "renamed '{}' to '{}', {} entries updated",
                outcome.old_name,
                outcome.project.name,
                outcome.updated_entries_count
            );
        }
        ProjectAction::Deactivate { id } => {
            ctx.registry.deactivate(id)?;
            println!("deactivated project {id}");
        }
        ProjectAction::List => {
            let projects = ctx.registry.list_active()?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
    }
    Ok(())
}
