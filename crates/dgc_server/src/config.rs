//! Environment-driven server configuration.
//!
//! Every key has a default except `DGC_LOG_DIR` and `DGC_FIXED_DATE`, whose
//! absence selects stderr logging and the local calendar date respectively.

use chrono::NaiveDate;
use dgc_core::default_log_level;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: &str = "5000";
const DEFAULT_DB_PATH: &str = "dgc.sqlite3";
const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub public_dir: PathBuf,
    /// Pins the rotation date, for staging and demos.
    pub fixed_date: Option<NaiveDate>,
}

impl Config {
    /// Reads configuration from process environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "DGC_PORT", DEFAULT_PORT)?,
            db_path: PathBuf::from(lookup("DGC_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into())),
            log_level: lookup("DGC_LOG_LEVEL").unwrap_or_else(|| default_log_level().into()),
            log_dir: lookup("DGC_LOG_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            public_dir: PathBuf::from(
                lookup("DGC_PUBLIC_DIR").unwrap_or_else(|| DEFAULT_PUBLIC_DIR.into()),
            ),
            fixed_date: lookup("DGC_FIXED_DATE")
                .map(|value| parse_value("DGC_FIXED_DATE", &value))
                .transpose()?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    parse_value(key, &value)
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        message: err.to_string(),
    })
}
