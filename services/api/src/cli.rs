use crate::demo::{run_analyze, run_classify, AnalyzeArgs, ClassifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use watcher::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "watcher-api",
    about = "Link official bulletin acts to budget programs and raise citizen alerts",
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
    /// Analyze a bulletin text file against a budget catalog CSV
    Analyze(AnalyzeArgs),
    /// Classify a single block of bulletin text
    Classify(ClassifyArgs),
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
        Command::Analyze(args) => run_analyze(args),
        Command::Classify(args) => run_classify(args),
    }
}
