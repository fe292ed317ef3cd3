//! Data types for the XOAP weather client
//!
//! Records returned by the fetch operations. All of them are plain owned
//! values; dropping a record releases everything it holds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XoapError};

/// Forecast schema version the extractor targets
pub const SUPPORTED_SCHEMA_VERSION: &str = "2.0";

/// Number of required links carried by a forecast
pub const MAX_LINKS: usize = 4;

/// Maximum number of forecast days the provider serves
pub const MAX_FORECAST_DAYS: u8 = 5;

/// Unit system for temperatures, distances and pressures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Imperial units (`unit=s`)
    #[default]
    Standard,
    /// Metric units (`unit=m`)
    Metric,
}

impl Unit {
    /// Single-letter code used in the request URL.
    pub fn code(&self) -> char {
        match self {
            Unit::Standard => 's',
            Unit::Metric => 'm',
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = XoapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "standard" => Ok(Unit::Standard),
            "m" | "metric" => Ok(Unit::Metric),
            other => Err(XoapError::InvalidOption(format!("unknown unit '{}'", other))),
        }
    }
}

/// How much of the forecast document to request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchDepth {
    /// Head and location only
    #[default]
    Location,
    /// Head, location and current conditions
    Current,
    /// Current conditions plus 1-5 forecast days
    Days(u8),
}

impl FetchDepth {
    /// Build a day-forecast depth, rejecting counts outside 1-5.
    pub fn days(count: u8) -> Result<Self> {
        if (1..=MAX_FORECAST_DAYS).contains(&count) {
            Ok(FetchDepth::Days(count))
        } else {
            Err(XoapError::InvalidOption(format!(
                "forecast days must be 1-{}, got {}",
                MAX_FORECAST_DAYS, count
            )))
        }
    }

    /// Number of forecast days this depth requests.
    pub fn day_count(&self) -> usize {
        match self {
            FetchDepth::Days(n) => usize::from(*n),
            _ => 0,
        }
    }

    /// Whether current conditions are part of the response.
    pub fn includes_current(&self) -> bool {
        !matches!(self, FetchDepth::Location)
    }
}

impl std::str::FromStr for FetchDepth {
    type Err = XoapError;

    /// Accepts `loc`, `cc`, or a day count `1`-`5`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loc" | "location" => Ok(FetchDepth::Location),
            "cc" | "current" => Ok(FetchDepth::Current),
            other => {
                let count: u8 = other.parse().map_err(|_| {
                    XoapError::InvalidOption(format!("unknown fetch depth '{}'", other))
                })?;
                FetchDepth::days(count)
            }
        }
    }
}

/// Required link (url + description) shipped with every forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub description: String,
}

/// Wind reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Either a number or a word such as "calm"
    pub speed: String,
    /// Either a number or "N/A"
    pub gust: String,
    /// Direction in degrees, 0-359 (N=0, E=90, S=180, W=270)
    pub direction: i32,
    /// Compass label (N, NE, NNE, ...)
    pub compass: String,
}

impl Wind {
    /// Numeric wind speed; textual speeds read as zero.
    pub fn speed_value(&self) -> f32 {
        leading_float(&self.speed)
    }

    /// Numeric gust; "N/A" reads as zero.
    pub fn gust_value(&self) -> f32 {
        leading_float(&self.gust)
    }
}

/// Weather for one half of a forecast day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub icon: i32,
    pub condition: String,
    /// Abbreviated condition ("Shwrs Early")
    pub condition_short: String,
    /// Percent chance of precipitation, 0-100
    pub precipitation_chance: i32,
    pub humidity: i32,
    pub wind: Wind,
}

/// One forecast day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub week_day: String,
    /// Month and day label, e.g. "Oct 15"
    pub date: String,
    pub high: i32,
    pub low: i32,
    pub sunrise: String,
    pub sunset: String,
    /// 7:00 to 19:00
    pub day: Weather,
    /// 19:00 to 7:00
    pub night: Weather,
}

/// Severe weather alert attached to current conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SevereAlert {
    pub text: String,
    pub link: String,
}

/// Present-moment weather observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Time the observation was last updated
    pub last_updated: String,
    /// Observation station the reading comes from
    pub observation_station: String,
    pub temperature: i32,
    pub feels_like: i32,
    pub icon: i32,
    pub condition: String,
    pub humidity: i32,
    pub alert: Option<SevereAlert>,
    pub visibility: f32,
    pub dew_point: i32,
    pub pressure: f32,
    /// Barometric trend, e.g. "falling"
    pub pressure_trend: String,
    pub moon_icon: i32,
    pub moon_phase: String,
    pub uv_index: f32,
    pub uv_description: String,
    pub wind: Wind,
}

/// Unit labels from the forecast `head` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitLabels {
    pub locale: String,
    pub temperature: String,
    pub distance: String,
    pub speed: String,
    pub precipitation: String,
    pub pressure: String,
}

/// Full parsed forecast response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// At most `MAX_LINKS`, in document order
    pub links: Vec<Link>,
    /// Present iff the fetch depth requested current conditions
    pub current: Option<CurrentConditions>,
    /// Exactly as many entries as requested days
    pub days: Vec<Day>,
    pub location_id: String,
    pub location_name: String,
    pub latitude: f32,
    pub longitude: f32,
    pub sunrise: String,
    pub sunset: String,
    /// Time zone offset from UTC in hours
    pub zone: i32,
    /// Time the forecast was fetched
    pub fetched_at: String,
    pub units: UnitLabels,
    /// Value of the root `ver` attribute, if any
    pub schema_version: Option<String>,
}

impl Forecast {
    /// Whether the document declared the schema version this crate targets.
    pub fn schema_supported(&self) -> bool {
        is_supported_version(self.schema_version.as_deref())
    }
}

/// Compare a declared schema version against `SUPPORTED_SCHEMA_VERSION`.
pub(crate) fn is_supported_version(found: Option<&str>) -> bool {
    found
        .and_then(|v| v.trim().parse::<f32>().ok())
        .zip(SUPPORTED_SCHEMA_VERSION.parse::<f32>().ok())
        .is_some_and(|(found, wanted)| found == wanted)
}

/// Rain gauge readings from the nearest station
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rain {
    pub rain_last_hour: f32,
    pub rain_today: f32,
    pub raining: bool,
    pub airport_id: Option<String>,
    pub station_id: Option<String>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    /// Location id usable with `SessionOption::LocationId`
    pub id: String,
    /// Display name, e.g. "Rochester, NY"
    pub name: String,
}

/// Parse the leading number of a string, ignoring whatever follows it.
///
/// "12 mph" -> 12.0, "calm" -> 0.0, "" -> 0.0
pub(crate) fn leading_float(text: &str) -> f32 {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return 0.0;
    }
    trimmed[..end].parse().unwrap_or(0.0)
}

/// Parse the leading integer of a string, ignoring whatever follows it.
pub(crate) fn leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    trimmed[..end].parse().unwrap_or(0)
}
