//! Process configuration, read once from the environment at start-up.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `None` runs on the in-memory stores.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    pub upload_dest: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            database_url: None,
            database_max_connections: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_secs: 86_400,
            upload_dest: PathBuf::from("./uploads"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: try_load("PORT", defaults.port),
            database_url: var("DATABASE_URL"),
            database_max_connections: try_load(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            jwt_secret: var("JWT_SECRET").unwrap_or_else(|| {
                warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret.clone()
            }),
            jwt_ttl_secs: try_load("JWT_TTL_SECS", defaults.jwt_ttl_secs),
            upload_dest: var("UPLOAD_DEST")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dest),
        }
    }

    pub fn jwt_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.jwt_ttl_secs.max(1))
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key`, falling back to `default` when unset or malformed.
fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}; using default: {default}");
            default
        }),
    }
}
