use chrono::Utc;

use crate::error::BrokerResult;
use crate::registry::delayed_key;
use crate::store::Store;

pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Per-queue time-indexed collection of not-yet-visible messages
/// (SPEC_FULL §4.4). Body is the member identity: at most one delayed
/// entry per (queue, body), re-inserting overwrites the deadline.
pub struct DelayedSet {
    store: Store,
}

impl DelayedSet {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn add(&self, queue: &str, body: &str, delay_s: i64) -> BrokerResult<()> {
        let deadline = now_unix() + delay_s.max(0);
        self.store.zadd(&delayed_key(queue), body, deadline).await
    }

    pub async fn add_at(&self, queue: &str, body: &str, deadline: i64) -> BrokerResult<()> {
        self.store.zadd(&delayed_key(queue), body, deadline).await
    }

    pub async fn del(&self, queue: &str, body: &str) -> BrokerResult<()> {
        self.store.zrem(&delayed_key(queue), body).await
    }

    /// Extends (or sets) the invisibility window for an in-flight message.
    pub async fn set_visibility(&self, queue: &str, body: &str, extra_s: i64) -> BrokerResult<()> {
        self.add_at(queue, body, now_unix() + extra_s.max(0)).await
    }

    pub async fn due(&self, queue: &str, as_of: i64) -> BrokerResult<Vec<String>> {
        self.store.zrangebyscore(&delayed_key(queue), 0, as_of).await
    }

    pub async fn remove_due(&self, queue: &str, as_of: i64) -> BrokerResult<()> {
        self.store.zremrangebyscore(&delayed_key(queue), 0, as_of).await
    }

    pub async fn delete(&self, queue: &str) -> BrokerResult<()> {
        self.store.del(&delayed_key(queue)).await
    }
}
