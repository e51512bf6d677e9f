//! Runtime configuration read from the process environment.
//!
//! | variable | default |
//! |---|---|
//! | `CARD_ANALYZER_HOST` | `127.0.0.1` |
//! | `CARD_ANALYZER_PORT` | `8080` |
//! | `CARD_ANALYZER_DB` | `cards.sqlite` |
//! | `CARD_ANALYZER_BLOB_DIR` | `blobs` |
//! | `CARD_ANALYZER_MAX_UPLOAD_BYTES` | `10485760` (10 MB) |

use std::path::PathBuf;
use thiserror::Error;

pub const ENV_HOST: &str = "CARD_ANALYZER_HOST";
pub const ENV_PORT: &str = "CARD_ANALYZER_PORT";
pub const ENV_DB: &str = "CARD_ANALYZER_DB";
pub const ENV_BLOB_DIR: &str = "CARD_ANALYZER_BLOB_DIR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "CARD_ANALYZER_MAX_UPLOAD_BYTES";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub blob_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: PathBuf::from("cards.sqlite"),
            blob_dir: PathBuf::from("blobs"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from any variable source; unset or blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(host) = get(ENV_HOST) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get(ENV_PORT) {
            config.port = parse_number(ENV_PORT, &port)?;
        }
        if let Some(db) = get(ENV_DB) {
            config.db_path = PathBuf::from(db);
        }
        if let Some(dir) = get(ENV_BLOB_DIR) {
            config.blob_dir = PathBuf::from(dir);
        }
        if let Some(max) = get(ENV_MAX_UPLOAD_BYTES) {
            config.max_upload_bytes = parse_number(ENV_MAX_UPLOAD_BYTES, &max)?;
            if config.max_upload_bytes == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_MAX_UPLOAD_BYTES,
                    value: max,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(config)
    }

    pub fn bind_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, " 9090 "),
            (ENV_DB, "/var/lib/cards/cards.sqlite"),
            (ENV_BLOB_DIR, "/var/lib/cards/blobs"),
            (ENV_MAX_UPLOAD_BYTES, "2048"),
        ]))
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/cards/cards.sqlite"));
        assert_eq!(config.blob_dir, PathBuf::from("/var/lib/cards/blobs"));
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[(ENV_PORT, "  ")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup(&[(ENV_PORT, "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_PORT, .. }));

        let err = Config::from_lookup(lookup(&[(ENV_MAX_UPLOAD_BYTES, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_MAX_UPLOAD_BYTES, .. }));
    }
}
