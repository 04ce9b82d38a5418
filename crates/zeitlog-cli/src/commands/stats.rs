use clap::Subcommand;
use zeitlog_core::stats::{aggregate, WeekWindow};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Weekly totals, overall and per project
    Week {
        /// Calendar year; defaults to the week containing today
        #[arg(long, requires = "week")]
        year: Option<i32>,
        /// Calendar week number (Jan-4 anchor rule)
        #[arg(long, requires = "year")]
        week: Option<u32>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::context()?;

    match action {
        StatsAction::Week { year, week } => {
            let window = match (year, week) {
                (Some(year), Some(week)) => WeekWindow::for_iso_week(year, week)?,
                _ => WeekWindow::current(),
            };
            let entries = {
                let db = ctx.db.lock().unwrap_or_else(|p| p.into_inner());
                db.entries_started_between(window.start, window.end)?
            };
            let report = aggregate(&entries, &window);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
