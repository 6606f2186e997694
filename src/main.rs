//! kget - list Kubernetes resources as grouped tables
//!
//! A `kubectl get` style command: objects are fetched from the cluster (or
//! read from manifests with `--local`), converted to tables by kind and
//! streamed to stdout.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use kget::cli::{self, ConfigSubcommand, GetArgs};
use kget::config::ConfigLoader;
use std::path::PathBuf;
use std::process::ExitCode;

/// kget - list Kubernetes resources as grouped tables
#[derive(Parser, Debug)]
#[command(name = "kget")]
#[command(about = "List Kubernetes resources as grouped tables", long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Display one or many resources
    Get(GetArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = ConfigLoader::load();
    cli::init_logging(args.verbose, &config.logger.level, args.log_file.as_deref())?;
    tracing::debug!("Configuration loaded: {:?}", config);

    match args.command {
        Command::Get(get) => cli::run_get(get, &config).await,
        Command::Config { subcommand } => {
            cli::handle_config_command(subcommand)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => {
            cli::display_version();
            Ok(ExitCode::SUCCESS)
        }
    }
}
