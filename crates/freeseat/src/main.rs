mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "freeseat")]
#[command(about = "Keep asking until the free tier says yes", long_about = None)]
struct Cli {
    /// INI-style env file layered under the real environment
    #[arg(long, global = true, env = "FREESEAT_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Append log output to this file (ANSI disabled)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the acquisition loop until success, already-satisfied, or a
    /// fatal error
    Acquire,
    /// One-shot probe: is the target already satisfied?
    Check,
    /// Resolve tenancy, availability domains, subnet and image, then print
    /// them
    Resolve,
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Version => {
            println!("freeseat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Acquire => commands::acquire::run(cli.env_file.as_deref()).await,
        Commands::Check => commands::check::run(cli.env_file.as_deref()).await,
        Commands::Resolve => commands::resolve::run(cli.env_file.as_deref()).await,
    }
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
