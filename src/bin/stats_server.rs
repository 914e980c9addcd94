//! Stats Server - HTTP front end for the 60-second transaction window
//!
//! Usage:
//!   cargo run --release --bin stats_server
//!
//! Routes:
//!   POST   /transactions  {"amount": "12.3343", "timestamp": "2018-07-17T09:59:51.312Z"}
//!   DELETE /transactions
//!   GET    /statistics
//!
//! Environment variables:
//!   TXSTATS_BIND_ADDR - Interface to bind (default: 0.0.0.0)
//!   TXSTATS_PORT - Port to listen on (default: 8080)
//!   RUST_LOG - Logging level (optional, default: info)

use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;
use txstats::boundary::routes;
use txstats::window_core::{BucketedWindow, BUCKET_COUNT, WINDOW_MS};
use txstats::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ServerConfig::from_env();

    info!("🚀 Starting txstats server");
    info!("   ├─ Bind: {}", config.socket_addr());
    info!("   ├─ Window: {}ms across {} buckets", WINDOW_MS, BUCKET_COUNT);
    info!("   └─ RUST_LOG: {}", config.rust_log.as_deref().unwrap_or("info (default)"));

    let window = Arc::new(BucketedWindow::new());

    let (addr, server) = warp::serve(routes(window)).try_bind_with_graceful_shutdown(
        config.socket_addr(),
        async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
                Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
            }
        },
    )?;

    info!("✅ Listening on http://{}", addr);
    info!("🔄 Press CTRL+C to shutdown gracefully");

    server.await;

    info!("✅ txstats server stopped");
    Ok(())
}
