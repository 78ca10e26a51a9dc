use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use stocksync_core::domain::DeliveryOutcome;
use stocksync_core::impls::{FileStore, HttpSubmissionService, TracingEventSink};
use stocksync_core::ports::{EventSink, OrderSubmissionService};
use stocksync_core::{
    FlushReport, OfflineOrderQueue, OrderLine, OrderPayload, QueueBuilder, QueueEvent, SyncConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stocksync", about = "Offline order queue for the warehouse inventory client")]
struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(long, env = "STOCKSYNC_SERVER")]
    server: Option<String>,

    /// Directory holding the persisted queue (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Confirm an order now; park it locally if the server cannot be reached
    Confirm(OrderArgs),
    /// Park an order locally without trying the server (offline mode)
    Enqueue(OrderArgs),
    /// Connectivity is back: replay parked orders in order
    Flush,
    /// Show the parked orders (the CLI does not probe connectivity)
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Discard every parked order
    Clear,
}

#[derive(Debug, clap::Args)]
struct OrderArgs {
    /// Who received the products
    #[arg(long, default_value = "")]
    recipient: String,

    /// Products as NUMBER:QUANTITY (e.g. A-12:3)
    #[arg(required = true, value_parser = parse_line)]
    items: Vec<OrderLine>,
}

fn parse_line(raw: &str) -> Result<OrderLine, String> {
    let (number, quantity) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NUMBER:QUANTITY, got {raw:?}"))?;
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad quantity in {raw:?}: {e}"))?;
    Ok(OrderLine::new(number.trim(), quantity))
}

/// Presentation side: what the user sees for queue notifications.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: &QueueEvent) {
        match event {
            QueueEvent::Enqueued { pending, .. } => {
                println!("No connection: order saved locally ({pending} pending), it will be sent automatically.");
            }
            QueueEvent::Dropped { id, reason } => {
                eprintln!("Failed to sync saved order {id}: {reason}");
            }
            QueueEvent::FlushCompleted { delivered, .. } if *delivered > 0 => {
                println!("Synced {delivered} saved orders.");
            }
            QueueEvent::PersistFailed { reason } => {
                eprintln!("Error: could not save the offline queue: {reason}");
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // (A) 設定
    let mut config = SyncConfig::load().context("Failed to load config")?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if let Some(data_dir) = cli.data_dir {
        config.queue.data_dir = data_dir;
    }

    // (B) ports の実装を用意
    let store = FileStore::open(&config.queue.data_dir).with_context(|| {
        format!(
            "Failed to open queue storage at {}",
            config.queue.data_dir.display()
        )
    })?;
    let http = Arc::new(
        HttpSubmissionService::new(&config.server).context("Failed to build HTTP client")?,
    );

    // (C) キューを構築（永続化済みのエントリを読み込む）
    let queue = QueueBuilder::from_shared(Arc::new(store), http.clone())
        .with_config(&config.queue)
        .initially_online(false)
        .event_sink(TracingEventSink)
        .event_sink(ConsoleSink)
        .build()
        .context("Failed to load offline queue")?;

    match cli.command {
        Command::Confirm(args) => confirm(&queue, &*http, payload(args)).await,
        Command::Enqueue(args) => {
            let entry = queue.enqueue(payload(args)).await?;
            println!("queued {}", entry.id);
            Ok(())
        }
        Command::Flush => {
            let report = queue.connectivity_changed(true).await?;
            print_report(report.unwrap_or_default());
            Ok(())
        }
        Command::Status { json } => status(&queue, json).await,
        Command::Clear => {
            let removed = queue.clear().await?;
            println!("removed {removed} parked orders");
            Ok(())
        }
    }
}

fn payload(args: OrderArgs) -> OrderPayload {
    OrderPayload::new(args.recipient, args.items)
}

/// Live confirm with offline fallback: transient failures park the order,
/// permanent ones are reported and nothing is queued.
async fn confirm(
    queue: &OfflineOrderQueue,
    http: &dyn OrderSubmissionService,
    payload: OrderPayload,
) -> anyhow::Result<()> {
    let payload = payload.normalized()?;
    match DeliveryOutcome::classify(http.submit(&payload).await) {
        DeliveryOutcome::Delivered(receipt) => {
            match receipt.order_number {
                Some(number) => println!("Quantities deducted. Order number: {number}"),
                None => println!("Quantities deducted."),
            }
            Ok(())
        }
        DeliveryOutcome::Permanent { status, reason } => {
            bail!("server rejected the order (HTTP {status}): {reason}")
        }
        DeliveryOutcome::Transient { reason } => {
            tracing::warn!(%reason, "confirm failed, saving order locally");
            queue.enqueue(payload).await?;
            Ok(())
        }
    }
}

async fn status(queue: &OfflineOrderQueue, json: bool) -> anyhow::Result<()> {
    let entries = queue.entries().await;
    if json {
        let out = serde_json::json!({
            "pending": entries.len(),
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", pending_summary(entries.len()));
    for entry in entries {
        println!(
            "{}  {}  recipient={:?}  lines={}  qty={}  attempts={}{}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.payload.recipient_name,
            entry.payload.products.len(),
            entry.payload.total_quantity(),
            entry.attempts,
            entry
                .last_error
                .map(|e| format!("  last_error={e:?}"))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

/// The queue here is always built offline, so the offline indicator would
/// say nothing about the server. Only the count is shown.
fn pending_summary(pending: usize) -> String {
    match pending {
        0 => "no parked orders".to_string(),
        1 => "1 parked order".to_string(),
        n => format!("{n} parked orders"),
    }
}

fn print_report(report: FlushReport) {
    println!(
        "delivered={} dropped={} remaining={}",
        report.delivered, report.dropped, report.remaining
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_number_and_quantity() {
        assert_eq!(parse_line("A-12:3").unwrap(), OrderLine::new("A-12", 3));
        assert_eq!(parse_line(" B:7 ").unwrap(), OrderLine::new("B", 7));
    }

    #[test]
    fn rejects_malformed_items() {
        assert!(parse_line("A-12").is_err());
        assert!(parse_line("A-12:x").is_err());
        assert!(parse_line("A-12:-1").is_err());
    }

    #[test]
    fn status_summary_does_not_claim_offline() {
        assert_eq!(pending_summary(0), "no parked orders");
        assert_eq!(pending_summary(1), "1 parked order");
        assert_eq!(pending_summary(3), "3 parked orders");
        assert!(!pending_summary(3).contains("offline"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
