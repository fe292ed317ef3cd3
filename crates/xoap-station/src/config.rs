//! Station configuration file
//!
//! Line-oriented `KEY=value` (or `KEY value`) text. Lines starting with `#`
//! and blank lines are ignored.
//!
//! ```text
//! # XOAP credentials
//! PID=1004124588
//! LKEY=079f24145f208494
//! LOCID=14623
//! FORECASTED_DAYS=3
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use xoap_core::types::MAX_FORECAST_DAYS;

/// Days forecast when the file does not say otherwise
pub const DEFAULT_FORECAST_DAYS: u8 = 1;

/// Error loading the station configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config key {0} is missing or empty")]
    MissingKey(&'static str),
}

/// The four strings the station hands to the weather session
#[derive(Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub partner_id: String,
    pub license_key: String,
    pub location_id: String,
    /// Forecast days, 1-5
    pub forecast_days: u8,
}

impl fmt::Debug for StationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationConfig")
            .field("partner_id", &"[REDACTED]")
            .field("license_key", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .field("forecast_days", &self.forecast_days)
            .finish()
    }
}

impl StationConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration text.
    ///
    /// The first occurrence of a key wins. A missing or unparseable forecast
    /// day count falls back to `DEFAULT_FORECAST_DAYS`.
    ///
    /// # Errors
    /// `ConfigError::MissingKey` if `PID`, `LKEY` or `LOCID` is absent.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut partner_id = None;
        let mut license_key = None;
        let mut location_id = None;
        let mut forecast_days = None;

        for line in text.lines() {
            let Some((key, value)) = split_line(line) else {
                continue;
            };
            let slot = match key {
                "PID" => &mut partner_id,
                "LKEY" => &mut license_key,
                "LOCID" => &mut location_id,
                // FORECASETED_DAYS is the spelling older config files use
                "FORECASTED_DAYS" | "FORECASETED_DAYS" => &mut forecast_days,
                other => {
                    debug!(key = other, "ignoring unknown config key");
                    continue;
                }
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.to_string());
            }
        }

        Ok(Self {
            partner_id: partner_id.ok_or(ConfigError::MissingKey("PID"))?,
            license_key: license_key.ok_or(ConfigError::MissingKey("LKEY"))?,
            location_id: location_id.ok_or(ConfigError::MissingKey("LOCID"))?,
            forecast_days: parse_days(forecast_days.as_deref()),
        })
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line
        .split_once(|c: char| c == '=' || c.is_whitespace())
        .unwrap_or((line, ""));
    let value = value.trim_start();
    let value = value.strip_prefix('=').unwrap_or(value);
    Some((key.trim(), value.trim()))
}

fn parse_days(raw: Option<&str>) -> u8 {
    let Some(raw) = raw else {
        return DEFAULT_FORECAST_DAYS;
    };
    match raw.parse::<u8>() {
        Ok(days) if (1..=MAX_FORECAST_DAYS).contains(&days) => days,
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_FORECAST_DAYS,
                "invalid forecast day count, using default"
            );
            DEFAULT_FORECAST_DAYS
        }
    }
}
