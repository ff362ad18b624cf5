//! Store configuration resolved from the process environment.
//!
//! # Responsibility
//! - Resolve the database location.
//! - Carry the key/value size bounds enforced by durable maps.
//!
//! # Invariants
//! - Invalid or blank environment values fall back to defaults; resolving
//!   configuration never fails.
//! - `max_key_bytes` is never below the width of a generated message id.

use crate::model::message::GENERATED_ID_LEN;
use log::warn;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DSOCIAL_DB_PATH";
pub const MAX_KEY_BYTES_ENV: &str = "DSOCIAL_MAX_KEY_BYTES";
pub const MAX_VALUE_BYTES_ENV: &str = "DSOCIAL_MAX_VALUE_BYTES";
pub const LOG_DIR_ENV: &str = "DSOCIAL_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "dsocial_messages.sqlite3";
const DEFAULT_MAX_KEY_BYTES: usize = 44;
const DEFAULT_MAX_VALUE_BYTES: usize = 1024;

/// Size limits applied to map keys and encoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBounds {
    pub max_key_bytes: usize,
    pub max_value_bytes: usize,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

/// Settings needed to open a message store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Explicit database file; `None` means the temp-dir default.
    pub db_path: Option<PathBuf>,
    pub bounds: MapBounds,
    /// Directory for rolling log files; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Reads configuration from `DSOCIAL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = MapBounds::default();
        let bounds = MapBounds {
            max_key_bytes: parse_limit(
                &lookup,
                MAX_KEY_BYTES_ENV,
                GENERATED_ID_LEN,
                defaults.max_key_bytes,
            ),
            max_value_bytes: parse_limit(&lookup, MAX_VALUE_BYTES_ENV, 1, defaults.max_value_bytes),
        };

        Self {
            db_path: parse_path(&lookup, DB_PATH_ENV),
            bounds,
            log_dir: parse_path(&lookup, LOG_DIR_ENV),
        }
    }

    /// Database file to open.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
    }
}

fn parse_path(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<PathBuf> {
    lookup(name)
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn parse_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    min: usize,
    default: usize,
) -> usize {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value >= min => value,
        _ => {
            warn!(
                "event=config_fallback module=config status=ignored var={} min={} default={}",
                name, min, default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MapBounds, StoreConfig, DB_PATH_ENV, LOG_DIR_ENV, MAX_KEY_BYTES_ENV, MAX_VALUE_BYTES_ENV,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.bounds, MapBounds::default());
        assert!(config
            .resolved_db_path()
            .ends_with("dsocial_messages.sqlite3"));
    }

    #[test]
    fn reads_path_and_limits() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /tmp/custom.db "),
            (MAX_KEY_BYTES_ENV, "64"),
            (MAX_VALUE_BYTES_ENV, "4096"),
            (LOG_DIR_ENV, "/var/log/dsocial"),
        ]));
        assert_eq!(config.resolved_db_path(), PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/dsocial")));
        assert_eq!(config.bounds.max_key_bytes, 64);
        assert_eq!(config.bounds.max_value_bytes, 4096);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, "   "),
            (MAX_KEY_BYTES_ENV, "0"),
            (MAX_VALUE_BYTES_ENV, "lots"),
        ]));
        assert_eq!(config.db_path, None);
        assert_eq!(config.bounds, MapBounds::default());
    }

    #[test]
    fn key_bound_below_generated_id_width_falls_back() {
        for raw in ["16", "35"] {
            let config = StoreConfig::from_lookup(lookup_from(&[(MAX_KEY_BYTES_ENV, raw)]));
            assert_eq!(config.bounds.max_key_bytes, MapBounds::default().max_key_bytes);
        }

        let config = StoreConfig::from_lookup(lookup_from(&[(MAX_KEY_BYTES_ENV, "36")]));
        assert_eq!(config.bounds.max_key_bytes, 36);
    }
}
