//! Remap CLI
//!
//! Command-line interface for recomputing field migration mappings

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "remap")]
#[command(about = "Resolve and evaluate field-by-field schema migration mappings")]
#[command(version = remap_core::VERSION)]
#[command(
    long_about = "remap resolves the effective action of every field in a mapping, suggests\n\
actions for undecided fields, and reports which fields still need attention.\n\
\n\
Examples:\n  \
remap evaluate snapshot.json                      # Evaluate without manual decisions\n  \
remap evaluate snapshot.yaml -m manual.yaml       # Apply operator decisions\n  \
remap evaluate snapshot.json --format json        # Full result set as JSON\n  \
remap config show                                 # Print the effective configuration"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (remap.yaml/remap.json/.remaprc.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute actions, recommendations and evaluations for a field snapshot
    #[command(alias = "eval")]
    Evaluate {
        /// Field snapshot produced by the comparison step (JSON or YAML)
        snapshot: PathBuf,

        /// Manual entries document (JSON or YAML)
        #[arg(short, long)]
        manual: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Only list fields that still need attention
        #[arg(long)]
        unresolved_only: bool,

        /// Exit with a non-zero code if any field is incompatible
        #[arg(long)]
        fail_on_incompatible: bool,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as YAML
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report
    Human,
    /// Full result set as JSON
    Json,
}

fn main() {
    let cli = Cli::parse();

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "remap=error",
        1 => "remap=warn",
        2 => "remap=info",
        3 => "remap=debug",
        _ => "remap=trace",
    };
    remap_core::init_tracing_with_filter(log_level);

    match run_command(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("remap failed: {:#}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Run the selected command and return the process exit code
fn run_command(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Some(Commands::Evaluate {
            snapshot,
            manual,
            format,
            unresolved_only,
            fail_on_incompatible,
        }) => commands::evaluate_command(
            &snapshot,
            manual.as_deref(),
            cli.config.as_deref(),
            format,
            unresolved_only,
            fail_on_incompatible,
            !cli.no_color,
        ),

        Some(Commands::Config {
            action: ConfigAction::Show,
        }) => commands::config_show_command(cli.config.as_deref()).map(|_| 0),

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("remap {}", remap_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
            } else {
                println!("{}", remap_core::VERSION);
            }
            Ok(0)
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(0)
        }
    }
}
