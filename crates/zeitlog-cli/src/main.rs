use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zeitlog", version, about = "Zeitlog time tracking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Time entry management
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Export completed entries as CSV lines
    Export {
        /// Lower date bound (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,
        /// Upper date bound (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Entry { action } => commands::entry::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Export { from, to } => commands::export::run(from, to),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
