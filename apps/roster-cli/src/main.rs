//! roster - reconcile directory group membership from a YAML file
//!
//! Connection settings come from `ROSTER_*` environment variables (a `.env`
//! file is loaded if present). Logs go to stderr and follow `RUST_LOG`.

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use error::CliResult;

/// roster - Directory group membership reconciliation
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes apply would make
    Plan(commands::plan::PlanArgs),

    /// Reconcile a group's membership with a desired-state file
    Apply(commands::apply::ApplyArgs),

    /// Show the current members of a group
    Read(commands::read::ReadArgs),

    /// Remove every member recorded in the state file
    Destroy(commands::destroy::DestroyArgs),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info,roster=debug",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Apply(args) => commands::apply::execute(args).await,
        Commands::Read(args) => commands::read::execute(args).await,
        Commands::Destroy(args) => commands::destroy::execute(args).await,
    }
}
