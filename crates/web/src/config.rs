//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Connection pool size.
    pub db_pool_size: u32,
    /// Directory uploaded media is stored in.
    pub media_dir: PathBuf,
    /// Public URL prefix the media directory is served under.
    pub media_base_url: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Spendable points it costs to grow a leaf.
    pub leaf_cost: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `NARINYLAND_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:narinyland.db?mode=rwc` |
    /// | `DB_POOL_SIZE` | Connection pool size | `20` |
    /// | `MEDIA_DIR` | Upload directory | `./media` |
    /// | `MEDIA_BASE_URL` | Public media URL prefix | `/media` |
    /// | `MAX_UPLOAD_BYTES` | Upload size limit | `52428800` |
    /// | `LEAF_COST` | Points per leaf | `100` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("NARINYLAND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            lookup("SQLITE_PATH").unwrap_or_else(|| "sqlite:narinyland.db?mode=rwc".to_string());

        let media_dir = lookup("MEDIA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./media"));

        let media_base_url = lookup("MEDIA_BASE_URL").unwrap_or_else(|| "/media".to_string());

        let config = Self {
            addr,
            database_url,
            db_pool_size: parse_number(&lookup, "DB_POOL_SIZE", 20)?,
            media_dir,
            media_base_url,
            max_upload_bytes: parse_number(&lookup, "MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            leaf_cost: parse_number(&lookup, "LEAF_COST", 100)?,
        };

        if config.db_pool_size == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "DB_POOL_SIZE",
                value: "0".to_string(),
            });
        }
        if config.leaf_cost < 0 {
            return Err(ConfigError::InvalidNumber {
                name: "LEAF_COST",
                value: config.leaf_cost.to_string(),
            });
        }

        Ok(config)
    }

    /// Path the media directory is mounted at, without a trailing slash.
    /// `None` when media is served from another origin.
    pub fn media_route(&self) -> Option<String> {
        let base = self.media_base_url.trim().trim_end_matches('/');
        if base.starts_with('/') && base.len() > 1 {
            Some(base.to_string())
        } else {
            None
        }
    }
}

fn parse_number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid NARINYLAND_ADDR format")]
    InvalidAddr,

    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}
