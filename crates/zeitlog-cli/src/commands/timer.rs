use clap::Subcommand;
use zeitlog_core::timer::TimerState;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer for a project
    Start {
        /// Project name
        project: String,
        /// What is being worked on
        #[arg(long)]
        description: Option<String>,
    },
    /// Stop the running timer
    Stop,
    /// Print the current timer state as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::context()?;

    match action {
        TimerAction::Start {
            project,
            description,
        } => {
            let entry = ctx.machine.start(&project, description.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        TimerAction::Stop => {
            let entry = ctx.machine.stop()?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        TimerAction::Status => match ctx.machine.running()? {
            Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
            None => println!("{}", serde_json::to_string_pretty(&TimerState::Idle)?),
        },
    }
    Ok(())
}
