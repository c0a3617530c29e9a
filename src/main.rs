use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::error;

use drowsewatch_lib::{build_store, init_logging, replay_trace, Monitor, SettingsStore};

/// Drowsiness monitoring from facial landmark traces.
#[derive(Parser)]
#[command(name = "drowsewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file.
    #[arg(short, long, global = true, default_value = "drowsewatch.json")]
    settings: PathBuf,

    /// Keep sessions in this SQLite file instead of the backend.
    #[arg(long, global = true)]
    offline_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSONL landmark trace through a full session and print the summary.
    Replay {
        /// One `{ "capturedAt", "landmarks" }` object per line.
        samples: PathBuf,
    },

    /// List stored sessions, newest first.
    Sessions,

    /// Per-minute breakdown and notable moments of one stored session.
    Review { session_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = SettingsStore::load_with_env(cli.settings)?.get();
    if cli.offline_db.is_some() {
        settings.database_path = cli.offline_db;
    }

    let store = build_store(&settings)?;
    let monitor = Monitor::new(store, settings.analysis_config());

    let output = match cli.command {
        Commands::Replay { samples } => {
            serde_json::to_string_pretty(&replay_trace(&monitor, &samples).await?)?
        }
        Commands::Sessions => serde_json::to_string_pretty(&monitor.list_sessions().await?)?,
        Commands::Review { session_id } => {
            serde_json::to_string_pretty(&monitor.review(&session_id).await?)?
        }
    };
    println!("{output}");

    monitor.shutdown().await
}
