use crate::error::{BrokerError, BrokerResult};
use crate::registry::ready_key;
use crate::store::Store;

/// Minimum/maximum clamp for `waitSeconds`, resolving the spec's open
/// question about `BRPOP`'s "0 means block forever" semantics: the HTTP
/// surface never blocks indefinitely (SPEC_FULL §9 decision #3).
pub const MIN_WAIT_SECS: u64 = 1;
pub const MAX_WAIT_SECS: u64 = 30;

pub fn clamp_wait_seconds(requested: i64) -> u64 {
    let requested = requested.max(0) as u64;
    requested.clamp(MIN_WAIT_SECS, MAX_WAIT_SECS)
}

/// Per-queue FIFO of messages ready for immediate pop (SPEC_FULL §4.3).
pub struct ReadyBuffer {
    store: Store,
}

impl ReadyBuffer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn push(&self, queue: &str, body: &str) -> BrokerResult<()> {
        self.store.lpush(&ready_key(queue), body).await
    }

    /// Pipelined batch-push, used only by the promoter to move a run of
    /// due delayed entries in one round trip.
    pub async fn multi_push(&self, queue: &str, bodies: &[String]) -> BrokerResult<()> {
        self.store.lpush_multi(&ready_key(queue), bodies).await
    }

    pub async fn pop(&self, queue: &str, wait_s: u64) -> BrokerResult<String> {
        match self.store.brpop(&ready_key(queue), wait_s).await? {
            Some(body) => Ok(body),
            None => Err(BrokerError::Timeout),
        }
    }

    pub async fn delete(&self, queue: &str) -> BrokerResult<()> {
        self.store.del(&ready_key(queue)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_seconds_clamped_into_bounds() {
        assert_eq!(clamp_wait_seconds(0), MIN_WAIT_SECS);
        assert_eq!(clamp_wait_seconds(-5), MIN_WAIT_SECS);
        assert_eq!(clamp_wait_seconds(1), 1);
        assert_eq!(clamp_wait_seconds(1000), MAX_WAIT_SECS);
    }
}
