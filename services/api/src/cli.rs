use crate::report::{run_overview, run_projects, run_report, OverviewArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use task_pulse::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Task Pulse",
    about = "Analyze project task sheets and serve the task dashboard",
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
    /// Print the dashboard for one task sheet
    Report(ReportArgs),
    /// Print one summary line per configured project
    Overview(OverviewArgs),
    /// List the configured projects and their task sources
    Projects,
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
        Command::Report(args) => run_report(args),
        Command::Overview(args) => run_overview(args),
        Command::Projects => run_projects(),
    }
}
