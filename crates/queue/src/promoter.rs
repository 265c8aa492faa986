use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::delayed::{now_unix, DelayedSet};
use crate::ready::ReadyBuffer;
use crate::registry::Registry;
use crate::store::Store;

const TICK: Duration = Duration::from_secs(1);
const LOCK_TTL: Duration = Duration::from_secs(5);
const LOCK_NAME: &str = "promoter";

/// Moves due delayed entries into the ready list for a single queue, once a
/// second, for as long as the queue remains registered (SPEC_FULL §4.5).
///
/// Acquires the shared distributed mutex fresh each tick and releases it at
/// the end of that same tick — the corrected policy from SPEC_FULL §9,
/// replacing a "hold until shutdown" policy that would starve other broker
/// processes.
pub async fn run_promoter(queue_name: String, store: Store, registry: Arc<Registry>) {
    let delayed = DelayedSet::new(store.clone());
    let ready = ReadyBuffer::new(store.clone());
    let mut interval = tokio::time::interval(TICK);

    loop {
        interval.tick().await;

        if !matches!(registry.exists(&queue_name).await, Ok(true)) {
            debug!(queue = %queue_name, "queue deregistered, stopping promoter");
            return;
        }

        if let Err(e) = promote_once(&queue_name, &store, &delayed, &ready).await {
            warn!(queue = %queue_name, error = %e, "promoter tick failed, will retry next tick");
        }
    }
}

async fn promote_once(
    queue_name: &str,
    store: &Store,
    delayed: &DelayedSet,
    ready: &ReadyBuffer,
) -> crate::error::BrokerResult<()> {
    let guard = match store.try_lock(LOCK_NAME, LOCK_TTL).await? {
        Some(g) => g,
        None => return Ok(()), // another process holds the lock this tick
    };

    let now = now_unix();
    let due = delayed.due(queue_name, now).await?;
    if !due.is_empty() {
        delayed.remove_due(queue_name, now).await?;
        ready.multi_push(queue_name, &due).await?;
        debug!(queue = %queue_name, count = due.len(), "promoted delayed entries to ready");
    }

    guard.release().await
}

/// Single broker-wide task purging delayed entries older than each queue's
/// retention horizon (SPEC_FULL §4.5 "Janitor"). Runs over a snapshot of
/// known queue names taken at the start of each tick.
pub async fn run_janitor(store: Store, registry: Arc<Registry>) {
    let delayed = DelayedSet::new(store);
    let mut interval = tokio::time::interval(TICK);

    loop {
        interval.tick().await;
        let names = registry.known_names().await;
        for name in names {
            let Some(cfg) = registry.get(&name).await else {
                continue;
            };
            if cfg.retention_s <= 0 {
                continue;
            }
            let cutoff = now_unix() - cfg.retention_s;
            if let Err(e) = delayed.remove_due(&name, cutoff).await {
                warn!(queue = %name, error = %e, "janitor purge failed, will retry next tick");
            }
        }
    }
}
