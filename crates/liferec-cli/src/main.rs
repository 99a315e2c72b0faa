//! liferec CLI
//!
//! Command-line interface for liferec - record short life events in a local
//! JSON journal.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use liferec_core::{Config, RecordStore, StoreError};

mod commands;
mod editor;
mod output;
mod tui;

use commands::record::FieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "liferec")]
#[command(about = "liferec - Utility to record life events")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this database file instead of the default (must exist)
    #[arg(short, long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Use this config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Record a new life event
    #[command(visible_alias = "c")]
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show one record, or list all records
    #[command(visible_alias = "r", alias = "ls")]
    Read {
        /// Record ID (lr-3, #3 or 3)
        id: Option<String>,
    },
    /// Change a record's tag, title or content
    #[command(visible_alias = "u")]
    Update {
        /// Record ID (lr-3, #3 or 3)
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a record
    #[command(visible_alias = "d", alias = "rm")]
    Delete {
        /// Record ID (lr-3, #3 or 3)
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, debug, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, &output);
            exit_code(&e)
        }
    }
}

/// 2 for bad input (unknown id, invalid fields), 1 for everything else
fn exit_code(error: &anyhow::Error) -> ExitCode {
    match find_store_error(error) {
        Some(e) if e.is_input_error() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn find_store_error(error: &anyhow::Error) -> Option<&StoreError> {
    error.chain().find_map(|e| e.downcast_ref::<StoreError>())
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;

    // TUI is the default when no command is given
    let Some(command) = cli.command else {
        return tui::run(&config, cli.file.as_deref());
    };
    if matches!(command, Commands::Tui) {
        return tui::run(&config, cli.file.as_deref());
    }

    init_logging();

    let mut store = RecordStore::open(cli.file.as_deref(), &config)?;
    tracing::debug!("Using database {:?}", store.path());

    match command {
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Create { fields } => commands::record::create(&mut store, fields, output),
        Commands::Read { id } => commands::record::read(&store, id, output),
        Commands::Update { id, fields } => {
            commands::record::update(&mut store, id, fields, output)
        }
        Commands::Delete { id, yes } => commands::record::delete(&mut store, id, yes, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Print an error, with a recovery hint for store errors
fn report_error(error: &anyhow::Error, output: &Output) {
    let hint = find_store_error(error).and_then(StoreError::recovery_suggestion);

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "status": "error",
                "message": format!("{:#}", error),
                "hint": hint
            })
        );
        return;
    }

    eprintln!("Error: {:#}", error);
    if let Some(hint) = hint {
        if !output.is_quiet() {
            eprintln!("Hint: {}", hint);
        }
    }
}

/// Initialize stderr logging for CLI commands
///
/// Only initializes if LIFEREC_LOG environment variable is set.
fn init_logging() {
    let Ok(log_level) = std::env::var("LIFEREC_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("liferec_core={},liferec={}", log_level, log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
