use crate::report::{run_import, run_migrate, run_stats, ImportArgs, MigrateArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use progress_tracker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Progress Tracker",
    about = "Record daily behaviour scores and report achievement from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print overall and per-period statistics from a data snapshot
    Stats(StatsArgs),
    /// Convert a legacy 1-5 snapshot to the current 0-2 schema
    Migrate(MigrateArgs),
    /// Merge a CSV score sheet into a data snapshot
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Stats(args) => run_stats(args),
        Command::Migrate(args) => run_migrate(args),
        Command::Import(args) => run_import(args),
    }
}
