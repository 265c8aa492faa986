use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::delayed::DelayedSet;
use crate::error::{BrokerError, BrokerResult};
use crate::promoter::{run_janitor, run_promoter};
use crate::ready::ReadyBuffer;
use crate::registry::{QueueConfig, Registry};
use crate::store::Store;

/// Binds external operations to the Registry/Ready/Delayed components
/// (SPEC_FULL §4.6). Holds no state of its own beyond its component
/// handles — the single owning context other code is built around.
pub struct Dispatcher {
    store: Store,
    registry: Arc<Registry>,
    ready: ReadyBuffer,
    delayed: DelayedSet,
    janitor_started: AsyncMutex<bool>,
}

impl Dispatcher {
    /// Builds a dispatcher and spawns a task that drains the registry's
    /// announcement channel, starting one promoter per announced queue.
    pub fn new(store: Store) -> Arc<Self> {
        let (registry, mut spawn_rx) = Registry::spawn(store.clone());

        let promoter_store = store.clone();
        let promoter_registry = registry.clone();
        tokio::spawn(async move {
            while let Some(config) = spawn_rx.recv().await {
                tokio::spawn(run_promoter(
                    config.name,
                    promoter_store.clone(),
                    promoter_registry.clone(),
                ));
            }
        });

        Arc::new(Self {
            store: store.clone(),
            registry,
            ready: ReadyBuffer::new(store.clone()),
            delayed: DelayedSet::new(store),
            janitor_started: AsyncMutex::new(false),
        })
    }

    /// Recovers queue configs from the durable store and launches a
    /// promoter per recovered queue, then starts the single janitor task
    /// (SPEC_FULL §4.2 "Startup recovery").
    pub async fn recover_and_start(self: &Arc<Self>) -> BrokerResult<()> {
        let recovered = self.registry.recover().await?;
        for cfg in recovered {
            info!(queue = %cfg.name, "recovered queue at startup, starting promoter");
            tokio::spawn(run_promoter(cfg.name, self.store.clone(), self.registry.clone()));
        }
        self.start_janitor().await;
        Ok(())
    }

    async fn start_janitor(self: &Arc<Self>) {
        let mut started = self.janitor_started.lock().await;
        if *started {
            return;
        }
        *started = true;
        tokio::spawn(run_janitor(self.store.clone(), self.registry.clone()));
    }

    pub async fn create_queue(&self, config: QueueConfig) -> BrokerResult<()> {
        self.registry.create(config).await
    }

    pub async fn update_queue(&self, config: QueueConfig) -> BrokerResult<()> {
        self.registry.update(config).await
    }

    pub async fn push(&self, queue: &str, body: &str, delay_s_opt: Option<i64>) -> BrokerResult<()> {
        let config = self
            .registry
            .get(queue)
            .await
            .ok_or_else(|| BrokerError::NoSuchQueue(queue.to_string()))?;

        let effective_delay = match delay_s_opt {
            Some(d) if d > 0 => d,
            _ => config.default_delay_s,
        };

        if effective_delay > 0 {
            self.delayed.add(queue, body, effective_delay).await
        } else {
            self.ready.push(queue, body).await
        }
    }

    pub async fn pop(&self, queue: &str, wait_s: u64) -> BrokerResult<String> {
        let config = self
            .registry
            .get(queue)
            .await
            .ok_or_else(|| BrokerError::NoSuchQueue(queue.to_string()))?;

        let body = self.ready.pop(queue, wait_s).await?;
        // Starts the invisibility window. Not atomic with the pop above —
        // accepted tradeoff, see SPEC_FULL §9 decision #2.
        self.delayed
            .add(queue, &body, config.visibility_timeout_s)
            .await?;
        Ok(body)
    }

    pub async fn delete_message(&self, queue: &str, body: &str) -> BrokerResult<()> {
        if !self.registry.exists(queue).await? {
            return Err(BrokerError::NoSuchQueue(queue.to_string()));
        }
        self.delayed.del(queue, body).await
    }

    pub async fn extend_visibility(&self, queue: &str, body: &str, extra_s: i64) -> BrokerResult<()> {
        let config = self
            .registry
            .get(queue)
            .await
            .ok_or_else(|| BrokerError::NoSuchQueue(queue.to_string()))?;

        // SPEC_FULL §4.4: a non-positive `extra_s` (including the 0 a missing
        // form field coerces to) falls back to the queue's configured
        // visibility timeout rather than setting the deadline to `now`.
        let effective_extra = if extra_s > 0 {
            extra_s
        } else {
            config.visibility_timeout_s
        };
        self.delayed.set_visibility(queue, body, effective_extra).await
    }

    pub async fn delete_queue(&self, queue: &str) -> BrokerResult<()> {
        self.ready.delete(queue).await?;
        self.delayed.delete(queue).await?;
        self.registry.delete(queue).await
    }
}
