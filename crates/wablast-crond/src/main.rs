//! `wablast-crond` — the scheduler daemon.
//!
//! Startup order: logging, config, health gate against the messaging
//! service, SQLite, then the reconcile loop. A failed health gate exits
//! non-zero before any timer is armed.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};
use wablast_core::WablastConfig;
use wablast_scheduler::{wait_until_healthy, Dispatcher, JobStore, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wablast_crond=info,wablast_scheduler=info".into()),
        )
        .init();

    let config_path = std::env::var("WABLAST_CONFIG").ok();
    let config = WablastConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("config load failed ({e}), using defaults");
        WablastConfig::default()
    });

    let base_url = config.app.base_url();
    let client = reqwest::Client::new();
    if let Err(e) = wait_until_healthy(
        &client,
        &base_url,
        config.scheduler.health_max_attempts,
        Duration::from_secs(config.scheduler.health_retry_secs),
    )
    .await
    {
        error!("{e}; refusing to start");
        std::process::exit(1);
    }

    let db_path = &config.database.path;
    if let Some(parent) = Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!(path = %db_path, "opening database");
    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = JobStore::new(conn)?;

    let tz = wablast_cron::parse_tz(&config.scheduler.timezone);
    let scheduler = Scheduler::new(
        store,
        Dispatcher::new(base_url),
        tz,
        Duration::from_secs(config.scheduler.reconcile_interval_secs),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let run = tokio::spawn(scheduler.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = run.await;
    Ok(())
}
