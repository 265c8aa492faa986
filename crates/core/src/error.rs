use thiserror::Error;

/// Cross-cutting error vocabulary shared by the queue engine and the HTTP
/// surface. Component-specific errors (e.g. `sqslite_queue::BrokerError`)
/// wrap into this where they cross a crate boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),
}
