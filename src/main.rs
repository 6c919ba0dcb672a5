//! Mini Cache demo driver
//!
//! Walks through LRU eviction and TTL expiration against a small cache and
//! logs what happens at each step.

use std::time::Duration;

use anyhow::Context;
use mini_cache::{Cache, CacheConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo defaults, used unless the environment overrides them.
const DEMO_MAX_ENTRIES: usize = 2;
const DEMO_CLEANUP_INTERVAL: Duration = Duration::from_millis(100);

/// Main entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Build the cache config (environment or demo defaults)
/// 3. Show LRU eviction with capacity 2
/// 4. Show a TTL entry being removed by the maintenance task
/// 5. Close the cache, waiting for the maintenance task to exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = demo_config();
    info!(
        "Mini Cache demo starting: max_entries={}, cleanup_interval={:?}",
        config.max_entries, config.cleanup_interval
    );

    let cache = Cache::new(config);
    let outcome = run_demo(&cache).await;

    // Close even if the demo was interrupted or failed
    cache.close().await.context("closing cache")?;
    outcome
}

fn demo_config() -> CacheConfig {
    let overridden = ["CACHE_MAX_ENTRIES", "CACHE_CLEANUP_INTERVAL_MS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some());

    if overridden {
        CacheConfig::from_env()
    } else {
        CacheConfig::new(DEMO_MAX_ENTRIES, DEMO_CLEANUP_INTERVAL)
    }
}

async fn run_demo(cache: &Cache) -> anyhow::Result<()> {
    // == LRU eviction ==
    cache.set("a", b"A", Duration::ZERO).await?;
    cache.set("b", b"B", Duration::ZERO).await?;

    if let Some(v) = cache.get("a").await {
        info!("GET a = {:?} (touches a -> MRU)", String::from_utf8_lossy(&v));
    }

    // Overflows capacity 2 and evicts the LRU key, "b"
    cache.set("c", b"C", Duration::ZERO).await?;
    if cache.get("b").await.is_none() {
        info!("GET b: missing (evicted as LRU)");
    }
    info!("keys after eviction (MRU->LRU): {:?}", cache.keys().await);

    // == TTL expiration ==
    // No get() after expiry: the maintenance task has to remove it
    cache.set("ttl", b"short", Duration::from_millis(200)).await?;
    info!("keys after ttl set (MRU->LRU): {:?}", cache.keys().await);

    tokio::select! {
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping demo early");
            return Ok(());
        }
        _ = tokio::time::sleep(Duration::from_millis(500)) => {}
    }

    info!("keys after ttl + cleanup (MRU->LRU): {:?}", cache.keys().await);
    if cache.get("ttl").await.is_none() {
        info!("GET ttl: missing (expired and removed)");
    }

    let stats = serde_json::to_string(&cache.stats().await).context("serializing stats")?;
    info!("stats: {}", stats);
    info!("Demo finished");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
