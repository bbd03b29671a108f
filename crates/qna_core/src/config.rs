//! Runtime configuration sourced from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `QNA_DB_PATH` | SQLite file path | none (caller decides) |
//! | `QNA_LOG_LEVEL` | trace/debug/info/warn/error | build-mode default |
//! | `QNA_LOG_DIR` | absolute log directory | none (logging off) |
//! | `QNA_PAGE_SIZE` | default page size | 10 |
//! | `QNA_PAGE_SIZE_MAX` | page size cap | 50 |

use crate::logging::{default_log_level, normalize_level};
use crate::repo::question_repo::PageLimits;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "QNA_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "QNA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "QNA_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "QNA_PAGE_SIZE";
pub const ENV_PAGE_SIZE_MAX: &str = "QNA_PAGE_SIZE_MAX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QnaConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    pub page_limits: PageLimits,
}

impl Default for QnaConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
            page_limits: PageLimits::default(),
        }
    }
}

impl QnaConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        config.db_path = read(ENV_DB_PATH).map(PathBuf::from);
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: level.clone(),
            })?;
        }
        if let Some(value) = read(ENV_PAGE_SIZE) {
            config.page_limits.default_size = parse_page_size(ENV_PAGE_SIZE, value)?;
        }
        if let Some(value) = read(ENV_PAGE_SIZE_MAX) {
            config.page_limits.max_size = parse_page_size(ENV_PAGE_SIZE_MAX, value)?;
        }

        Ok(config)
    }
}

fn parse_page_size(key: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, QnaConfig, ENV_PAGE_SIZE_MAX};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = QnaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QnaConfig::default());
    }

    #[test]
    fn values_are_read_and_normalized() {
        let config = QnaConfig::from_lookup(lookup(&[
            ("QNA_DB_PATH", " /var/lib/qna/qna.sqlite3 "),
            ("QNA_LOG_LEVEL", "WARNING"),
            ("QNA_LOG_DIR", ""),
            ("QNA_PAGE_SIZE", "20"),
            ("QNA_PAGE_SIZE_MAX", "40"),
        ]))
        .unwrap();

        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/qna/qna.sqlite3"))
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.page_limits.default_size, 20);
        assert_eq!(config.page_limits.max_size, 40);
    }

    #[test]
    fn zero_or_garbage_page_sizes_are_rejected() {
        let err = QnaConfig::from_lookup(lookup(&[("QNA_PAGE_SIZE_MAX", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_PAGE_SIZE_MAX,
                value: "0".to_string()
            }
        );
        assert!(QnaConfig::from_lookup(lookup(&[("QNA_PAGE_SIZE", "ten")])).is_err());
        assert!(QnaConfig::from_lookup(lookup(&[("QNA_LOG_LEVEL", "loud")])).is_err());
    }
}
