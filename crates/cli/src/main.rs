//! `taskforge` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate`   — validate a workflow JSON file.
//! - `export-ics` — render a JSON event list as an iCalendar document.
//! - `sync-demo`  — run one sync pass over a JSON task list with the mock
//!                  provider and a local calendar, printing the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use calsync::{CalendarSyncEngine, SyncSettings};
use providers::mock::MockProvider;
use providers::{Calendar, CalendarEvent};

#[derive(Parser)]
#[command(
    name = "taskforge",
    about = "Workflow automation and calendar sync engine for tasks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Render a JSON array of calendar events as an .ics document.
    ExportIcs {
        /// Path to the events JSON file.
        path: PathBuf,
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run one sync pass over a JSON array of tasks against a local calendar.
    SyncDemo {
        /// Path to the tasks JSON file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let workflow: engine::Workflow =
                serde_json::from_str(&content).context("invalid workflow JSON")?;

            match engine::validate_workflow(&workflow) {
                Ok(()) => {
                    println!(
                        "workflow '{}' is valid ({} action(s), trigger {:?})",
                        workflow.name,
                        workflow.actions.len(),
                        workflow.trigger.kind
                    );
                }
                Err(e) => {
                    eprintln!("validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::ExportIcs { path, out } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let events: Vec<CalendarEvent> =
                serde_json::from_str(&content).context("invalid events JSON")?;

            let document = calsync::export_ics(&events);
            match out {
                Some(out_path) => {
                    std::fs::write(&out_path, document)
                        .with_context(|| format!("cannot write {}", out_path.display()))?;
                    info!("wrote {} event(s) to {}", events.len(), out_path.display());
                }
                None => print!("{document}"),
            }
        }
        Command::SyncDemo { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let tasks: Vec<domain::Task> =
                serde_json::from_str(&content).context("invalid tasks JSON")?;

            let provider = Arc::new(MockProvider::serving(vec![]));
            let sync_engine = CalendarSyncEngine::new(provider, SyncSettings::default());
            sync_engine.add_calendar(Calendar::local("Demo"));

            let result = sync_engine.sync(&tasks, None).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
