//! TTL Maintenance Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::cache::Shared;

/// Upper bound on the sweep period. Longer intervals cannot be added to an
/// instant without overflowing, and behave the same as "practically never".
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Spawns a task that sweeps expired entries every `interval` until
/// `shutdown` is cancelled.
///
/// Each sweep takes the write lock for its whole duration and compares
/// expiries against the tick's own timestamp. Cancellation is checked before
/// every tick and also interrupts the wait between ticks.
///
/// # Arguments
/// * `shared` - State shared with the owning cache
/// * `interval` - Time between sweeps; must be non-zero
/// * `shutdown` - Cancellation signal from the owning cache
///
/// # Returns
/// A JoinHandle the owner awaits after cancelling, so the task never
/// outlives the cache.
pub(crate) fn spawn_maintenance_task(
    shared: Arc<Shared>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = interval.min(MAX_SWEEP_INTERVAL);
        info!("Starting TTL maintenance task with interval of {:?}", period);

        // First sweep one full period after start
        let start = time::Instant::now()
            .checked_add(period)
            .unwrap_or_else(time::Instant::now);
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                tick = ticker.tick() => {
                    let removed = shared.sweep_expired(tick.into_std()).await;
                    if removed > 0 {
                        debug!("TTL sweep: removed {} expired entries", removed);
                    } else {
                        trace!("TTL sweep: no expired entries found");
                    }
                }
            }
        }

        info!("TTL maintenance task stopped");
    })
}
