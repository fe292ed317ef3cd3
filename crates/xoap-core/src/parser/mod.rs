//! Extractors for the XML feed documents
//!
//! Each extractor walks a parsed `Element` tree and returns an owned record:
//! - `envelope`: provider error envelope classification
//! - `forecast`: TWCi local weather documents
//! - `locations`: TWCi search results
//! - `rain`: Weather Underground station lookup and observation

pub mod envelope;
pub mod forecast;
pub mod locations;
pub mod rain;

// Re-export main parsing functions
pub use envelope::{classify, ensure_no_error};
pub use forecast::parse_forecast;
pub use locations::parse_locations;
pub use rain::{
    parse_observation, parse_station_lookup, NearbyStations, ObservationTarget, PrecipitationReading,
};

use crate::document::Element;
use crate::types::{leading_float, leading_int};

/// Trimmed content of a leaf element.
pub(crate) fn text(node: &Element) -> String {
    node.content().trim().to_string()
}

/// Integer content of a leaf element; missing or non-numeric reads as zero.
pub(crate) fn int(node: &Element) -> i32 {
    let value = leading_int(&node.content());
    i32::try_from(value).unwrap_or(0)
}

/// Float content of a leaf element; missing or non-numeric reads as zero.
pub(crate) fn float(node: &Element) -> f32 {
    leading_float(&node.content())
}
