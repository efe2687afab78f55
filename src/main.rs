//! # Pre-flight CLI (`preflight`)
//!
//! Runs a suite of environment and connectivity probes and prints a
//! consolidated report. The exit code makes it usable as a gate in scripts.
//!
//! ## Usage
//!
//! ```bash
//! preflight --config ./config/preflight.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `preflight check` | Full environment check (tools, folders, store, client config) |
//! | `preflight connect` | Open the document store and list its collections |
//! | `preflight verify` | Verify the tool server is ready to start |
//!
//! ## Examples
//!
//! ```bash
//! # Human-readable report
//! preflight check
//!
//! # Machine-readable report; exit code 1 on any failure
//! preflight check --format json
//!
//! # Treat warnings as failures too
//! preflight verify --strict
//! ```

use clap::{ArgAction, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rag_preflight::config;
use rag_preflight::report::{self, Format, TextReporter};
use rag_preflight::runner::run_probes;
use rag_preflight::suites::{self, Suite};

/// Pre-flight checks for a local-first RAG setup.
///
/// Reads its settings from a TOML file (`--config`). When the file does not
/// exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "preflight",
    about = "Pre-flight environment and connectivity checks for a local-first RAG setup",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/preflight.toml")]
    config: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: Format,

    /// Exit non-zero on warnings as well as failures.
    #[arg(long, global = true)]
    strict: bool,

    /// Disable coloured output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check tools, data folder, store, and client configuration.
    Check,

    /// Connect to the document store and list collections.
    Connect,

    /// Verify the tool server's prerequisites and registered tools.
    Verify,
}

impl Commands {
    fn suite(&self) -> Suite {
        match self {
            Commands::Check => Suite::Check,
            Commands::Connect => Suite::Connect,
            Commands::Verify => Suite::Verify,
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_or_default(&cli.config)?;
    let suite = cli.command.suite();
    let probes = suites::build(suite, &cfg);
    let report = run_probes(suite.name(), &probes).await;

    match cli.format {
        Format::Json => println!("{}", report::render_json(&report)?),
        Format::Text => {
            let color = !cli.no_color
                && std::env::var_os("NO_COLOR").is_none()
                && std::io::stdout().is_terminal();
            print!("{}", TextReporter::new(&cfg.install_command, color).render(&report));
        }
    }

    let code = report::exit_code(&report, cli.strict);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
