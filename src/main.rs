//! parcel-tracker - carrier tracking aggregation service
//!
//! Tracks parcels across Yamato, Sagawa, and Japan Post by fetching each
//! carrier's tracking page and extracting a normalized status timeline.
//!
//! Module structure:
//! - `domain/` - carriers, timelines, canonical status types
//! - `parsers/` - per-carrier HTML extraction
//! - `io/` - HTTP transport, tracking client, notification channel
//! - `services/` - refresh orchestration and registration
//! - `infra/` - configuration and the delivery store

use clap::{Parser, Subcommand};
use parcel_tracker::domain::{Carrier, DeliveryId, TrackingResult};
use parcel_tracker::infra::store::DeliveryStore;
use parcel_tracker::infra::{Config, JsonFileStore};
use parcel_tracker::io::{
    create_notify_channel, HttpTransport, NotifyPublisher, TrackingClient,
};
use parcel_tracker::services::{Refresher, Registrar};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// parcel-tracker - parcel tracking across Japanese carriers
#[derive(Parser, Debug)]
#[command(name = "parcel-tracker", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a parcel and fetch its first timeline
    Add {
        /// Tracking number (hyphens and spaces are ignored)
        number: String,
        /// Carrier: yamato, sagawa, japan-post
        carrier: Carrier,
        /// Free-text memo
        #[arg(short, long, default_value = "")]
        memo: String,
    },
    /// List tracked parcels with their latest status
    List,
    /// Refresh one parcel, or every parcel when no id is given
    Refresh {
        id: Option<i64>,
    },
    /// Remove a parcel
    Remove {
        id: i64,
    },
    /// Remove every parcel
    Clear,
    /// Refresh periodically and emit notifications on status changes
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        config_file = %config.config_file(),
        store_file = %config.store_file(),
        notifications = %config.notifications_enabled(),
        "parcel_tracker_starting"
    );

    let store: Arc<dyn DeliveryStore> = Arc::new(JsonFileStore::open(config.store_file())?);
    let transport = Arc::new(HttpTransport::new(config.http_timeout(), config.http_user_agent())?);
    let client = Arc::new(TrackingClient::new(transport));

    match args.command {
        Command::Add { number, carrier, memo } => {
            let registrar = Registrar::new(Arc::clone(&store), Arc::clone(&client));
            match registrar.add(&number, carrier, &memo).await {
                Ok(id) => println!("added delivery {id}"),
                Err(e) => anyhow::bail!("add failed: {e}"),
            }
        }
        Command::List => {
            for item in store.get_all().await? {
                let latest = item
                    .latest_entry()
                    .map(|entry| format!("{} {} {}", entry.date, entry.status, entry.location))
                    .unwrap_or_else(|| "状況不明".to_string());
                println!(
                    "{:>4}  {:<10}  {:<16}  {}",
                    item.id,
                    item.carrier.as_str(),
                    item.formatted_tracking_number(),
                    latest
                );
            }
        }
        Command::Refresh { id } => {
            let refresher = Refresher::new(store, client, None);
            match id {
                Some(id) => {
                    let id = DeliveryId(id);
                    report(id, &refresher.refresh_one(id).await);
                }
                None => {
                    for (id, result) in refresher.refresh_all().await {
                        report(id, &result);
                    }
                }
            }
        }
        Command::Remove { id } => {
            store.delete(DeliveryId(id)).await?;
            println!("removed delivery {id}");
        }
        Command::Clear => {
            store.delete_all().await?;
            println!("store cleared");
        }
        Command::Watch => run_watch(&config, store, client).await,
    }

    Ok(())
}

fn report(id: DeliveryId, result: &TrackingResult) {
    match result {
        TrackingResult::Success(timeline) => println!("{id}: {} entries", timeline.len()),
        TrackingResult::Error(message) => println!("{id}: error: {message}"),
    }
}

/// Periodic bulk refresh until ctrl-c. Notification events flow through the
/// fire-and-forget channel to the log sink; when notifications are gated
/// off the refresher is built without a sender and the publisher never
/// starts.
async fn run_watch(config: &Config, store: Arc<dyn DeliveryStore>, client: Arc<TrackingClient>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let notify = if config.notifications_enabled() {
        let (sender, rx) = create_notify_channel(256);
        let publisher = NotifyPublisher::new(rx);
        let publisher_shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            publisher.run(publisher_shutdown).await;
        });
        Some(sender)
    } else {
        None
    };

    let refresher = Refresher::new(store, client, notify);

    let shutdown_signal = shutdown_tx;
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_signal.send(true);
    });

    info!(interval_minutes = %config.refresh_interval_minutes(), "watch_started");
    let mut interval = tokio::time::interval(config.refresh_interval());
    let mut shutdown = shutdown_rx;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                refresher.refresh_all().await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("watch_stopped");
}
