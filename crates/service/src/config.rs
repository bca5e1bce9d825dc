use std::time::Duration;

use tunehost_db::PoolConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Tuning for multi-statement playlist operations.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Extra attempts after a serialization conflict (default: `3`).
    pub max_retries: u32,
    /// Deadline for one operation including retries, up to but excluding
    /// the final commit (default: `10s`).
    pub op_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            op_timeout: Duration::from_secs(10),
        }
    }
}

/// Everything the process needs, loaded from environment variables.
///
/// | Env Var                    | Default  |
/// |----------------------------|----------|
/// | `DATABASE_URL`             | required |
/// | `DB_MAX_CONNECTIONS`       | `20`     |
/// | `DB_ACQUIRE_TIMEOUT_SECS`  | `5`      |
/// | `PLAYLIST_TX_MAX_RETRIES`  | `3`      |
/// | `PLAYLIST_OP_TIMEOUT_SECS` | `10`     |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pool: PoolConfig,
    pub service: ServiceConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut pool = PoolConfig::new(database_url);
        if let Some(max) = parse_var(&lookup, "DB_MAX_CONNECTIONS")? {
            pool.max_connections = max;
        }
        if let Some(secs) = parse_var(&lookup, "DB_ACQUIRE_TIMEOUT_SECS")? {
            pool.acquire_timeout = Duration::from_secs(secs);
        }

        let mut service = ServiceConfig::default();
        if let Some(retries) = parse_var(&lookup, "PLAYLIST_TX_MAX_RETRIES")? {
            service.max_retries = retries;
        }
        if let Some(secs) = parse_var(&lookup, "PLAYLIST_OP_TIMEOUT_SECS")? {
            service.op_timeout = Duration::from_secs(secs);
        }

        Ok(Self { pool, service })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
