//! XOAP Weather Client Core Library
//!
//! This crate fetches forecasts, current conditions and rain-gauge readings
//! from The Weather Channel XOAP feed and Weather Underground, and turns the
//! XML responses into typed, owned records.
//!
//! # Features
//! - Location search
//! - Forecast with current conditions and up to 5 days
//! - Two-stage rain gauge lookup via the nearest weather station
//! - Provider error envelope classification
//! - Sensor-point mapping for device integrations

pub mod client;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod parser;
pub mod points;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::{ClientConfig, FeedClient, FeedResponse};
pub use endpoint::{Endpoint, FeedUrls};
pub use error::{ApiError, Result, TransportFailure, XoapError};
pub use points::{publish_forecast, publish_rain, SensorSink};
pub use session::{SessionOption, WeatherSession};
pub use types::{
    CurrentConditions, Day, FetchDepth, Forecast, LocationCandidate, Rain, Unit, Weather, Wind,
};
