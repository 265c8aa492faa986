use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use crate::error::{BrokerError, BrokerResult};
use crate::store::Store;

pub const QUEUE_NAMES_KEY: &str = "SysInfo_queue_names";

fn config_key(name: &str) -> String {
    format!("configureQueue_{name}")
}

pub fn ready_key(name: &str) -> String {
    format!("readyQueue_{name}")
}

pub fn delayed_key(name: &str) -> String {
    format!("delayQueue_{name}")
}

/// Per-queue configuration (SPEC_FULL §3 `QueueConfig`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub name: String,
    pub visibility_timeout_s: i64,
    pub retention_s: i64,
    pub default_delay_s: i64,
}

impl QueueConfig {
    fn to_hash_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("visibilityTimeout", self.visibility_timeout_s.to_string()),
            ("messageRetentionPeriod", self.retention_s.to_string()),
            ("delaySeconds", self.default_delay_s.to_string()),
        ]
    }

    fn from_hash(name: &str, fields: &HashMap<String, String>) -> Option<Self> {
        let parse = |k: &str| fields.get(k).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            visibility_timeout_s: parse("visibilityTimeout"),
            retention_s: parse("messageRetentionPeriod"),
            default_delay_s: parse("delaySeconds"),
        })
    }
}

/// Announcement sent to the registry drainer task after a successful
/// create/update (SPEC_FULL §4.2 "Update channel").
#[derive(Debug, Clone)]
pub struct Announcement {
    pub config: QueueConfig,
}

/// Durable catalogue of queue names and per-queue config, backed by an
/// in-process cache kept in sync by a single-writer drainer task.
pub struct Registry {
    store: Store,
    cache: Arc<RwLock<HashMap<String, QueueConfig>>>,
    announce_tx: mpsc::UnboundedSender<Announcement>,
}

impl Registry {
    /// Spawns the registry along with its announcement-drainer task. The
    /// drainer updates the durable name set and the in-process cache for
    /// every `create`/`update`, then forwards the config on the returned
    /// channel so the caller can spin up a promoter task per announced
    /// queue (SPEC_FULL §4.2/§4.5) without the registry needing to know
    /// about promoters directly.
    pub fn spawn(store: Store) -> (Arc<Self>, mpsc::UnboundedReceiver<QueueConfig>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Announcement>();
        let (spawn_tx, spawn_rx) = mpsc::unbounded_channel::<QueueConfig>();
        let cache: Arc<RwLock<HashMap<String, QueueConfig>>> = Arc::new(RwLock::new(HashMap::new()));
        let cache_for_task = cache.clone();
        let store_for_task = store.clone();

        tokio::spawn(async move {
            while let Some(ann) = rx.recv().await {
                let name = ann.config.name.clone();
                if let Err(e) = store_for_task.sadd(QUEUE_NAMES_KEY, &name).await {
                    warn!(queue = %name, error = %e, "failed to add queue name to durable set");
                }
                cache_for_task.write().await.insert(name.clone(), ann.config.clone());
                info!(queue = %name, "queue announced, spawning promoter");
                let _ = spawn_tx.send(ann.config);
            }
        });

        (
            Arc::new(Self {
                store,
                cache,
                announce_tx: tx,
            }),
            spawn_rx,
        )
    }

    /// Loads the durable name set and config hashes into the cache and
    /// returns the recovered configs, for startup promoter spin-up
    /// (SPEC_FULL §4.2 "Startup recovery"). A name with no matching hash is
    /// tolerated and simply omitted from the returned list, though it
    /// remains in the durable name set.
    pub async fn recover(&self) -> BrokerResult<Vec<QueueConfig>> {
        let names = self.store.smembers(QUEUE_NAMES_KEY).await?;
        let mut recovered = Vec::new();
        for name in names {
            let fields = self.store.hgetall(&config_key(&name)).await?;
            if let Some(cfg) = QueueConfig::from_hash(&name, &fields) {
                self.cache.write().await.insert(name.clone(), cfg.clone());
                recovered.push(cfg);
            } else {
                warn!(queue = %name, "known queue name has no config hash, skipping at startup");
            }
        }
        Ok(recovered)
    }

    pub async fn create(&self, config: QueueConfig) -> BrokerResult<()> {
        if config.visibility_timeout_s <= 0 {
            return Err(BrokerError::InvalidArgument(
                "VisibilityTimeout must be greater than zero!".to_string(),
            ));
        }
        if self.store.exists(&config_key(&config.name)).await? {
            return Err(BrokerError::AlreadyExists(config.name));
        }
        self.store
            .hset_multiple(&config_key(&config.name), &config.to_hash_fields())
            .await?;
        let _ = self.announce_tx.send(Announcement { config });
        Ok(())
    }

    pub async fn update(&self, config: QueueConfig) -> BrokerResult<()> {
        if config.visibility_timeout_s <= 0 {
            return Err(BrokerError::InvalidArgument(
                "VisibilityTimeout must be greater than zero!".to_string(),
            ));
        }
        if !self.store.exists(&config_key(&config.name)).await? {
            return Err(BrokerError::NotFound(config.name));
        }
        self.store
            .hset_multiple(&config_key(&config.name), &config.to_hash_fields())
            .await?;
        let _ = self.announce_tx.send(Announcement { config });
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Option<QueueConfig> {
        self.cache.read().await.get(name).cloned()
    }

    /// Checks the in-process cache first; on miss, falls through to a
    /// set-membership query against the store and does *not* backfill the
    /// cache (SPEC_FULL §4.2 — cache is populated only via announcements or
    /// startup recovery).
    pub async fn exists(&self, name: &str) -> BrokerResult<bool> {
        if self.cache.read().await.contains_key(name) {
            return Ok(true);
        }
        self.store.sismember(QUEUE_NAMES_KEY, name).await
    }

    pub async fn delete(&self, name: &str) -> BrokerResult<()> {
        self.store.del(&ready_key(name)).await?;
        self.store.del(&delayed_key(name)).await?;
        self.store.del(&config_key(name)).await?;
        self.store.srem(QUEUE_NAMES_KEY, name).await?;
        self.cache.write().await.remove(name);
        Ok(())
    }

    /// Snapshot of all currently-known queue names, used by the janitor to
    /// iterate without holding the cache lock across awaits.
    pub async fn known_names(&self) -> Vec<String> {
        self.cache.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_hash_roundtrip() {
        let cfg = QueueConfig {
            name: "q1".to_string(),
            visibility_timeout_s: 30,
            retention_s: 0,
            default_delay_s: 5,
        };
        let fields = cfg.to_hash_fields();
        let map: HashMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let recovered = QueueConfig::from_hash("q1", &map).unwrap();
        assert_eq!(recovered, cfg);
    }

    #[test]
    fn empty_hash_yields_no_config() {
        assert!(QueueConfig::from_hash("missing", &HashMap::new()).is_none());
    }
}
