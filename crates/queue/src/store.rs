use std::time::Duration;

use deadpool_redis::{Config as PoolConfig, Connection, Runtime};
use redis::{AsyncCommands, Script};
use uuid::Uuid;

use crate::error::{BrokerError, BrokerResult};

/// Thin pooled abstraction over the backing key-value store (SPEC_FULL §4.1).
///
/// All list/sorted-set/hash/set primitives the rest of the crate needs are
/// exposed as typed methods here so no other module touches `redis::cmd`
/// directly.
#[derive(Clone)]
pub struct Store {
    pool: deadpool_redis::Pool,
}

impl Store {
    pub fn connect(redis_url: &str, max_size: usize) -> BrokerResult<Self> {
        let mut cfg = PoolConfig::from_url(redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(max_size));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| BrokerError::InvalidArgument(format!("invalid redis url: {e}")))?;
        Ok(Self { pool })
    }

    async fn conn(&self) -> BrokerResult<Connection> {
        let mut conn = self.pool.get().await?;
        // liveness check on borrow, mirrors the ping-before-use convention
        // used elsewhere for pooled redis connections.
        if redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_err()
        {
            return Err(BrokerError::Store(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "stale pooled connection failed PING",
            ))));
        }
        Ok(conn)
    }

    // ---- list ops (Ready Buffer) -----------------------------------

    pub async fn lpush(&self, key: &str, value: &str) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        conn.lpush(key, value).await?;
        Ok(())
    }

    pub async fn lpush_multi(&self, key: &str, values: &[String]) -> BrokerResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let mut pipe = redis::pipe();
        for v in values {
            pipe.cmd("LPUSH").arg(key).arg(v).ignore();
        }
        pipe.query_async::<()>(&mut conn).await?;
        Ok(())
    }

    pub async fn brpop(&self, key: &str, wait_s: u64) -> BrokerResult<Option<String>> {
        let mut conn = self.conn().await?;
        let result: Option<(String, String)> = conn.brpop(key, wait_s as f64).await?;
        Ok(result.map(|(_, body)| body))
    }

    pub async fn del(&self, key: &str) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> BrokerResult<bool> {
        let mut conn = self.conn().await?;
        Ok(conn.exists(key).await?)
    }

    // ---- sorted set ops (Delayed Set) -------------------------------
    // Raw commands rather than typed AsyncCommands methods: ZADD's typed
    // helper takes (key, member, score) while the wire command is
    // `ZADD key score member` — spelling it out avoids relying on that
    // inversion reading correctly at every call site.

    pub async fn zadd(&self, key: &str, member: &str, score: i64) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn zrem(&self, key: &str, member: &str) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("ZREM")
            .arg(key)
            .arg(member)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn zrangebyscore(&self, key: &str, min: i64, max: i64) -> BrokerResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(redis::cmd("ZRANGEBYSCORE")
            .arg(key)
            .arg(min)
            .arg(max)
            .query_async(&mut conn)
            .await?)
    }

    pub async fn zremrangebyscore(&self, key: &str, min: i64, max: i64) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg(min)
            .arg(max)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    // ---- hash ops (Queue Registry config) ---------------------------

    pub async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        conn.hset_multiple::<_, _, _, ()>(key, fields).await?;
        Ok(())
    }

    pub async fn hgetall(&self, key: &str) -> BrokerResult<std::collections::HashMap<String, String>> {
        let mut conn = self.conn().await?;
        Ok(conn.hgetall(key).await?)
    }

    // ---- set ops (queue name set) ------------------------------------

    pub async fn sadd(&self, key: &str, member: &str) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        conn.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    pub async fn srem(&self, key: &str, member: &str) -> BrokerResult<()> {
        let mut conn = self.conn().await?;
        conn.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    pub async fn sismember(&self, key: &str, member: &str) -> BrokerResult<bool> {
        let mut conn = self.conn().await?;
        Ok(conn.sismember(key, member).await?)
    }

    pub async fn smembers(&self, key: &str) -> BrokerResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.smembers(key).await?)
    }

    /// Acquires a named, lease-based distributed mutex. Returns `None` if
    /// already held elsewhere (SPEC_FULL §4.1/§4.5).
    pub async fn try_lock(&self, name: &str, ttl: Duration) -> BrokerResult<Option<LockGuard>> {
        let token = Uuid::new_v4().to_string();
        let mut conn = self.conn().await?;
        let key = lock_key(name);
        let acquired: bool = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<Option<String>>(&mut conn)
            .await?
            .is_some();
        if acquired {
            Ok(Some(LockGuard {
                store: self.clone(),
                key,
                token,
            }))
        } else {
            Ok(None)
        }
    }
}

fn lock_key(name: &str) -> String {
    format!("lock_{name}")
}

/// Lua script mirroring the Redis docs' recommended "unlock only if I own
/// it" compare-and-delete, keeping release from clobbering a lock acquired
/// by another holder after this one's lease expired.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// RAII handle for a held distributed lock. Prefer calling
/// [`LockGuard::release`] explicitly so release errors are observable;
/// `Drop` performs a best-effort fire-and-forget release otherwise.
pub struct LockGuard {
    store: Store,
    key: String,
    token: String,
}

impl LockGuard {
    pub async fn release(self) -> BrokerResult<()> {
        let mut conn = self.store.conn().await?;
        let script = Script::new(RELEASE_SCRIPT);
        script
            .key(self.key.as_str())
            .arg(self.token.as_str())
            .invoke_async::<i64>(&mut conn)
            .await?;
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let store = self.store.clone();
        let key = self.key.clone();
        let token = self.token.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = store.conn().await {
                let script = Script::new(RELEASE_SCRIPT);
                let _ = script
                    .key(key.as_str())
                    .arg(token.as_str())
                    .invoke_async::<i64>(&mut conn)
                    .await;
            }
        });
    }
}
