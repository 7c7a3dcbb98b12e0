//! Standalone dice-duel server.
//!
//! Binds on `DUELFORGE_ADDR` (default `0.0.0.0:8080`) and serves the
//! duel protocol over WebSocket. Log verbosity follows `RUST_LOG`,
//! e.g. `RUST_LOG=duelforge=debug`.

use duelforge::DuelServerBuilder;
use duelforge_engine::EngineConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("DUELFORGE_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!(%addr, "starting duel server");
    let server = DuelServerBuilder::new()
        .bind(&addr)
        .engine_config(EngineConfig::default())
        .build()
        .await?;

    server.run().await?;
    Ok(())
}
