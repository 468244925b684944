// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, their defaults, and [`AppConfig`], which is
//! loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for ledger storage | `./data` |
//! | `STORAGE_BACKEND` | `redb`, `json` or `memory` | `redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ADMIN_ADDRESSES` | Comma-separated admin wallet addresses | empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage::{StorageBackend, DATA_ROOT};

/// Environment variable name for the ledger data directory.
///
/// Holds `ledger.redb` for the redb backend, or `students.json` and
/// `attendance.json` for the json backend.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the storage backend selector.
pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the admin wallet list.
///
/// Comma-separated; entries are trimmed and compared case-insensitively.
/// Blank entries are ignored.
pub const ADMIN_ADDRESSES_ENV: &str = "ADMIN_ADDRESSES";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
    /// Admin wallets, already normalized.
    pub admin_addresses: Vec<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidValue(HOST_ENV, e.to_string()))?;

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue(PORT_ENV, e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let data_dir = lookup(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DATA_ROOT));

        let backend = match lookup(STORAGE_BACKEND_ENV) {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|e| ConfigError::InvalidValue(STORAGE_BACKEND_ENV, e))?,
            None => StorageBackend::default(),
        };

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidValue(LOG_FORMAT_ENV, e))?,
            None => LogFormat::default(),
        };

        let admin_addresses = lookup(ADMIN_ADDRESSES_ENV)
            .map(|raw| parse_admin_addresses(&raw))
            .unwrap_or_default();

        Ok(Self {
            bind_address: SocketAddr::new(host, port),
            data_dir,
            backend,
            admin_addresses,
            log_format,
        })
    }
}

fn parse_admin_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}
