pub mod config;
pub mod error;

pub use config::Config;
pub use error::CoreError;

/// Initializes the global `tracing` subscriber from `RUST_LOG` (default
/// `info`). Safe to call once at process start; idempotent in tests.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
