//! fieldsync: keep a field catalog in step with a database schema.
//!
//! # Usage
//!
//! ```text
//! fieldsync sync <snapshot.json> [--keep-going] [--json]
//! fieldsync fields <snapshot.json> <table> [--all] [--json]
//! fieldsync events [--limit N]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use commands::{events::EventsArgs, fields::FieldsArgs, sync::SyncArgs};
use fieldsync_runner::LogFormat;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fieldsync",
    version,
    about = "Reconcile a field catalog against database schema snapshots",
    long_about = None,
)]
struct Cli {
    /// Log line format on stderr. Verbosity follows RUST_LOG.
    #[arg(long, value_enum, global = true, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync catalog fields for every table in a schema snapshot.
    Sync(SyncArgs),

    /// List catalog fields recorded for one table.
    Fields(FieldsArgs),

    /// Show recent sync begin/end events.
    Events(EventsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    fieldsync_runner::init_tracing(cli.log_format.into());
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Fields(args) => args.run(),
        Commands::Events(args) => args.run(),
    }
}
