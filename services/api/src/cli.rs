use crate::demo::{run_demo, run_import, run_quote, DemoArgs, ImportArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use offer_desk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Offer Desk",
    about = "Price residential acquisition leads and run the offer desk API",
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
    /// Price one set of intake answers without storing a lead
    Quote(QuoteArgs),
    /// Price every row of a lead CSV export
    Import(ImportArgs),
    /// Walk a sample lead through intake, photo analysis, and revaluation
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the scoring policy file
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Override how many days leads are kept before purging
    #[arg(long)]
    pub(crate) retention_days: Option<u32>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
        Command::Import(args) => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
