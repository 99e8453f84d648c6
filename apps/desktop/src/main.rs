use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ControllerOptions, DragEndEvent, DragLocation, HttpMatterGateway, KanbanTransitionController,
    MatterStatusStore, ReconcileMode, TransitionOutcome,
};
use shared::domain::{MatterId, MatterStatus};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "board", about = "Matters kanban board in the terminal")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    /// Seconds to wait for the matters API before giving up.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every column with its matters.
    Show,
    /// Drag a matter onto another column.
    Move {
        matter_id: i64,
        #[arg(value_parser = parse_status)]
        status: MatterStatus,
    },
}

fn parse_status(raw: &str) -> Result<MatterStatus, String> {
    raw.to_ascii_uppercase()
        .parse::<MatterStatus>()
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let timeout = Duration::from_secs(args.timeout_secs);
    let gateway = Arc::new(HttpMatterGateway::with_timeout(&args.server_url, timeout)?);
    let matters = gateway
        .list_matters()
        .await
        .with_context(|| format!("failed to load matters from {}", args.server_url))?;
    info!(count = matters.len(), "matters loaded");
    let store = Arc::new(MatterStatusStore::new(matters));

    match args.command {
        Command::Show => {
            print_board(&store).await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Move { matter_id, status } => {
            let matter_id = MatterId(matter_id);
            let source = match store.position_of(matter_id).await {
                Some((column, index)) => DragLocation::new(column, index),
                // Let the controller report the missing matter.
                None => DragLocation::new(MatterStatus::default(), 0),
            };
            let controller = KanbanTransitionController::with_options(
                Arc::clone(&store),
                gateway,
                ControllerOptions {
                    mode: ReconcileMode::Serialized,
                    persist_timeout: timeout,
                },
            );
            let event = DragEndEvent::new(matter_id, source, Some(DragLocation::new(status, 0)));
            let outcome = controller.handle_drag_end(event).await;
            print_board(&store).await;
            Ok(report_outcome(&outcome, store.last_error().await))
        }
    }
}

async fn print_board(store: &MatterStatusStore) {
    for (status, matters) in store.group_by_status().await {
        println!("{} ({})", status.label(), matters.len());
        for matter in matters {
            let number = matter.number.as_deref().unwrap_or("-");
            let client = matter.client_name.as_deref().unwrap_or("-");
            println!("  #{:<5} {:<12} {} [{}]", matter.id.0, number, matter.name, client);
        }
    }
}

fn report_outcome(outcome: &TransitionOutcome, banner: Option<String>) -> ExitCode {
    match outcome {
        TransitionOutcome::Ignored(reason) => {
            println!("nothing to do ({reason:?})");
            ExitCode::SUCCESS
        }
        TransitionOutcome::Committed(transition) => {
            println!(
                "moved matter {} from {} to {}",
                transition.matter_id, transition.from_status, transition.to_status
            );
            ExitCode::SUCCESS
        }
        TransitionOutcome::Rejected(_)
        | TransitionOutcome::RolledBack { .. }
        | TransitionOutcome::Superseded { .. } => {
            if let Some(error) = outcome.error() {
                eprintln!("{}: {error}", banner.as_deref().unwrap_or("error"));
            }
            ExitCode::FAILURE
        }
    }
}
