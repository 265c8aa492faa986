use std::env;

/// Broker-wide configuration, assembled from `.env` + process environment.
///
/// Mirrors the CLI flags the server additionally accepts (`host`, `port`,
/// `redis`, `auth`); CLI flags take precedence over env vars, which take
/// precedence over these defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub redis_addr: String,
    pub redis_auth: Option<String>,
    pub redis_pool_max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9394,
            redis_addr: "127.0.0.1:6379".to_string(),
            redis_auth: None,
            redis_pool_max_size: 16,
        }
    }
}

impl Config {
    /// Loads `.env` (if present) then reads environment variables over the
    /// defaults. CLI flags, parsed separately by the binary, are applied on
    /// top of the result via [`Config::apply_cli`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            host: env_or("SQSLITE_HOST", defaults.host),
            port: env_or("SQSLITE_PORT", defaults.port.to_string())
                .parse()
                .unwrap_or(defaults.port),
            redis_addr: env_or("SQSLITE_REDIS", defaults.redis_addr),
            redis_auth: env_opt("SQSLITE_REDIS_AUTH"),
            redis_pool_max_size: env_or(
                "SQSLITE_REDIS_POOL_MAX_SIZE",
                defaults.redis_pool_max_size.to_string(),
            )
            .parse()
            .unwrap_or(defaults.redis_pool_max_size),
        }
    }

    /// Builds a `redis://` connection URL, embedding the auth secret when set.
    pub fn redis_url(&self) -> String {
        match &self.redis_auth {
            Some(auth) if !auth.is_empty() => format!("redis://:{auth}@{}", self.redis_addr),
            _ => format!("redis://{}", self.redis_addr),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 9394);
        assert_eq!(cfg.redis_addr, "127.0.0.1:6379");
        assert!(cfg.redis_auth.is_none());
    }

    #[test]
    fn redis_url_without_auth() {
        let cfg = Config::default();
        assert_eq!(cfg.redis_url(), "redis://127.0.0.1:6379");
    }

    #[test]
    fn redis_url_with_auth() {
        let mut cfg = Config::default();
        cfg.redis_auth = Some("secret".to_string());
        assert_eq!(cfg.redis_url(), "redis://:secret@127.0.0.1:6379");
    }
}
