//! Event Load - posts random transactions to a running stats_server
//!
//! Spreads events over the last LOAD_MAX_AGE_MS milliseconds, tallies the
//! response codes, then compares the server's statistics with what it sent.
//!
//! Usage:
//!   cargo run --release --bin event_load -- [--reset]
//!
//!   --reset clears the server window before sending, so the final count can
//!   be checked against the number of accepted events.
//!
//! Environment variables:
//!   TXSTATS_TARGET_URL - Server base URL (default: http://127.0.0.1:8080)
//!   LOAD_EVENTS - Total events to send (default: 1000)
//!   LOAD_CONCURRENCY - Parallel senders (default: 8)
//!   LOAD_MAX_AGE_MS - Oldest generated event age (default: 59000)
//!   RUST_LOG - Logging level (optional, default: info)

use chrono::{Duration, Utc};
use dotenv::dotenv;
use log::{info, warn};
use rand::Rng;
use rust_decimal::Decimal;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use txstats::boundary::{StatisticsView, TransactionDto};

#[derive(Debug)]
struct LoadConfig {
    target_url: String,
    events: u64,
    concurrency: u64,
    max_age_ms: i64,
    reset_first: bool,
}

impl LoadConfig {
    fn from_env() -> Self {
        Self {
            target_url: env::var("TXSTATS_TARGET_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            events: env::var("LOAD_EVENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_000),
            concurrency: env::var("LOAD_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8)
                .max(1),
            max_age_ms: env::var("LOAD_MAX_AGE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(59_000),
            reset_first: env::args().any(|arg| arg == "--reset"),
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    created: AtomicU64,
    too_old: AtomicU64,
    unprocessable: AtomicU64,
    other: AtomicU64,
}

impl Tally {
    fn record(&self, status: u16) {
        let counter = match status {
            201 => &self.created,
            204 => &self.too_old,
            422 => &self.unprocessable,
            _ => &self.other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

fn random_transaction(max_age_ms: i64) -> TransactionDto {
    let mut rng = rand::thread_rng();
    let cents: i64 = rng.gen_range(1..=10_000_000);
    let age_ms = rng.gen_range(0..=max_age_ms.max(0));

    let timestamp = Utc::now() - Duration::milliseconds(age_ms);
    TransactionDto::new(
        Decimal::new(cents, 2).to_string(),
        timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = LoadConfig::from_env();

    info!("🚀 Starting event load");
    info!("   ├─ Target: {}", config.target_url);
    info!("   ├─ Events: {}", config.events);
    info!("   ├─ Concurrency: {}", config.concurrency);
    info!("   └─ Max age: {}ms", config.max_age_ms);

    let client = reqwest::Client::new();
    let transactions_url = format!("{}/transactions", config.target_url);
    let statistics_url = format!("{}/statistics", config.target_url);

    if config.reset_first {
        let status = client.delete(&transactions_url).send().await?.status();
        info!("🧹 Window reset ({})", status);
    }

    let tally = Arc::new(Tally::default());
    let started = std::time::Instant::now();
    let mut handles = Vec::with_capacity(config.concurrency as usize);

    for worker in 0..config.concurrency {
        // Spread the remainder over the first workers
        let share = config.events / config.concurrency
            + u64::from(worker < config.events % config.concurrency);
        let client = client.clone();
        let url = transactions_url.clone();
        let tally = tally.clone();
        let max_age_ms = config.max_age_ms;

        handles.push(tokio::spawn(async move {
            for _ in 0..share {
                let dto = random_transaction(max_age_ms);
                match client.post(&url).json(&dto).send().await {
                    Ok(resp) => tally.record(resp.status().as_u16()),
                    Err(err) => {
                        warn!("⚠️  Request failed: {}", err);
                        tally.record(0);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.await?;
    }

    let elapsed = started.elapsed();
    let created = tally.created.load(Ordering::Relaxed);

    info!("📊 Load finished in {:.2}s", elapsed.as_secs_f64());
    info!("   ├─ 201 Created: {}", created);
    info!("   ├─ 204 Too old: {}", tally.too_old.load(Ordering::Relaxed));
    info!("   ├─ 422 Unprocessable: {}", tally.unprocessable.load(Ordering::Relaxed));
    info!("   └─ Other/failed: {}", tally.other.load(Ordering::Relaxed));

    let stats: StatisticsView = client.get(&statistics_url).send().await?.json().await?;
    info!(
        "📈 Server statistics: count={} sum={} avg={} min={} max={}",
        stats.count, stats.sum, stats.avg, stats.min, stats.max
    );

    if config.reset_first && stats.count != created {
        warn!(
            "⚠️  Server counted {} events but {} were accepted (events may have aged out)",
            stats.count, created
        );
    }

    Ok(())
}
