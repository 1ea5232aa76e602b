//! revpack: sync, package and install a set of Debian projects.
//!
//! # Usage
//!
//! ```text
//! revpack [--config <file>] [-v] build [-p <name>[,<name>...]] [--auto]
//! revpack [--config <file>] [-v] install [-p <name>[,<name>...]]
//! revpack [--config <file>] [-v] list [--json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{build::BuildArgs, install::InstallArgs, list::ListArgs};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "REVPACK_LOG";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "revpack",
    version,
    about = "Build revisioned Debian packages from git projects",
    long_about = None,
)]
struct Cli {
    /// Configuration file (YAML, or JSON with a `.json` extension).
    /// Defaults to $REVPACK_CONFIG, then ~/.revpack/config.yaml.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync and build projects whose upstream changed.
    Build(BuildArgs),

    /// Install the current package of each project.
    Install(InstallArgs),

    /// Show configured projects and their latest builds.
    List(ListArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Build(args) => args.run(config),
        Commands::Install(args) => args.run(config),
        Commands::List(args) => args.run(config),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
