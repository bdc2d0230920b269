//! We can have a little hard-coded config, [as a
//! snack](https://knowyourmeme.com/memes/cats-can-have-a-little-salami).
//! Only the port and the store address come from the environment.

use anyhow::{Context, Result};
use std::env;
use tracing::info;

pub const DATABASE_NAME: &str = "notes-app";

/// Users and notes share this one collection.
pub const COLLECTION_NAME: &str = "notes-app-users";

pub const DEFAULT_PORT: u16 = 5000;

/// Browser origins allowed to call the API. These are compared byte-for-byte
/// against the `Origin` header, which never carries a trailing slash.
pub const ALLOWED_ORIGINS: [&str; 2] =
    ["http://localhost:5173", "https://notezen.netlify.app"];

/// Passing this as `DATABASE_URL` keeps every document in process memory.
pub const MEMORY_URL: &str = "memory://";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::var("PORT").ok(), env::var("DATABASE_URL").ok())
    }

    fn from_vars(
        port: Option<String>,
        database_url: Option<String>,
    ) -> Result<Self> {
        let port = match port {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value {raw:?}"))?,
            None => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };
        let database_url = database_url.unwrap_or_else(default_database_url);

        Ok(Config { port, database_url })
    }
}

pub fn default_database_url() -> String {
    format!("postgres://127.0.0.1:5432/{DATABASE_NAME}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(None, None).expect("defaults");
        assert_eq!(config.port, 5000);
        assert_eq!(
            config.database_url,
            "postgres://127.0.0.1:5432/notes-app"
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(
            Some("8080".to_string()),
            Some(MEMORY_URL.to_string()),
        )
        .expect("overrides");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, MEMORY_URL);
    }

    #[test]
    fn test_bad_port() {
        assert!(Config::from_vars(Some("five".to_string()), None).is_err());
        assert!(Config::from_vars(Some("70000".to_string()), None).is_err());
    }
}
