//! Runtime configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `TODO_ADDR` | `0.0.0.0:8080` | listen address |
//! | `TODO_DB_PATH` | `todos.db` | redb database file |
//! | `TODO_STATIC_DIR` | `static` | directory served under `/static/` |

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PATH: &str = "todos.db";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TODO_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("TODO_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr.clone(),
                source,
            })?;

        Ok(Self {
            addr,
            db_path: lookup("TODO_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            static_dir: lookup("TODO_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("todos.db"));
        assert_eq!(config.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn variables_override_defaults() {
        let config = config(&[
            ("TODO_ADDR", "127.0.0.1:3000"),
            ("TODO_DB_PATH", "/tmp/x.db"),
            ("TODO_STATIC_DIR", "assets"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.static_dir, PathBuf::from("assets"));
    }

    #[test]
    fn bad_address_is_rejected() {
        let err = config(&[("TODO_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid TODO_ADDR \"localhost\""));
    }
}
