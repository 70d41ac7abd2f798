use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_DOCS_DIR: &str = "docs";
pub const DEFAULT_SINCE_DAYS: u32 = 30;
/// A century of history is the longest look-back accepted.
pub const MAX_SINCE_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_address: String,
    /// Relative paths resolve against the analyzed project.
    pub docs_dir: PathBuf,
    pub since_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.into(),
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            since_days: DEFAULT_SINCE_DAYS,
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let since_days = match lookup("SINCE_DAYS") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "SINCE_DAYS",
                    value,
                })?,
            None => defaults.since_days,
        };
        if since_days > MAX_SINCE_DAYS {
            return Err(ConfigError::OutOfRange {
                name: "SINCE_DAYS",
                value: since_days,
                max: MAX_SINCE_DAYS,
            });
        }

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            docs_dir: lookup("DOCS_DIR").map(PathBuf::from).unwrap_or(defaults.docs_dir),
            since_days,
        })
    }
}
