use thiserror::Error;

/// Error vocabulary for the queue engine, transport-independent (SPEC §7).
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no such queue: {0}")]
    NoSuchQueue(String),

    #[error("queue already exists: {0}")]
    AlreadyExists(String),

    #[error("queue not found: {0}")]
    NotFound(String),

    #[error("timed out waiting for a message")]
    Timeout,

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
}

pub type BrokerResult<T> = Result<T, BrokerError>;
