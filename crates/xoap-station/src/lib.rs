//! XOAP Weather Station
//!
//! Plays the poller role for a device that exposes weather data as numbered
//! sensor points: loads the station configuration, drives one
//! `WeatherSession` update cycle and keeps the resulting point values.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chrono::Local;
//! use xoap_station::{PointTable, StationConfig, StationOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StationConfig::from_file("/etc/xoap-station.conf".as_ref())?;
//! let session = xoap_station::open_session(&config, &StationOptions::default())?;
//!
//! let mut points = PointTable::default();
//! xoap_station::update_weather(&session, &mut points, true, Local::now().naive_local()).await?;
//! println!("{}", points.render());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod poller;

use std::collections::BTreeMap;

use serde::Serialize;
use xoap_core::SensorSink;

pub use config::{ConfigError, StationConfig};
pub use poller::{open_session, update_weather, StationOptions};

/// In-memory sensor points, keyed by point index
///
/// Points keep their last value until overwritten, so a failed update
/// leaves the previous readings in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PointTable {
    values: BTreeMap<u32, f32>,
}

impl PointTable {
    /// Value of point `index`, if it was ever written.
    pub fn get(&self, index: u32) -> Option<f32> {
        self.values.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Points in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.values.iter().map(|(index, value)| (*index, *value))
    }

    /// One `index value` line per point.
    pub fn render(&self) -> String {
        self.iter()
            .map(|(index, value)| format!("{:>3}  {:.2}", index, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SensorSink for PointTable {
    fn set_value(&mut self, index: u32, value: f32) {
        self.values.insert(index, value);
    }
}
