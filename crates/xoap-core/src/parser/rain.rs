//! Rain gauge documents from Weather Underground
//!
//! Two documents feed one `Rain` record: a geo lookup listing the stations
//! near a location, then the current observation of one of those stations.
//! Each stage is parsed independently of the other.

use serde::{Deserialize, Serialize};

use crate::document::Element;
use crate::error::{Result, XoapError};

use super::envelope::ensure_no_error;
use super::float;

/// Stations discovered near a location by the geo lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyStations {
    /// ICAO code of the first airport station
    pub airport_id: Option<String>,
    /// Id of the first personal weather station
    pub station_id: Option<String>,
}

/// Station whose observation feeds the rain gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationTarget<'a> {
    /// Personal weather station id
    Personal(&'a str),
    /// Airport ICAO code
    Airport(&'a str),
}

impl NearbyStations {
    /// Station to observe: the personal station when known, else the airport.
    pub fn observation_target(&self) -> Option<ObservationTarget<'_>> {
        self.station_id
            .as_deref()
            .map(ObservationTarget::Personal)
            .or_else(|| self.airport_id.as_deref().map(ObservationTarget::Airport))
    }
}

/// Accumulated precipitation read from an observation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrecipitationReading {
    pub last_hour: f32,
    pub today: f32,
}

/// Parse the stage-one geo lookup.
///
/// Only the first `station` of the `airport` and `pws` groups under
/// `nearby_weather_stations` is considered.
///
/// # Errors
/// - `XoapError::Api` if the response is an error envelope
/// - `XoapError::NoStationFound` if neither an airport nor a personal station is listed
pub fn parse_station_lookup(root: &Element) -> Result<NearbyStations> {
    ensure_no_error(root)?;

    let mut stations = NearbyStations::default();
    for section in root.children_named("nearby_weather_stations") {
        for group in section.children() {
            match group.name() {
                "airport" if stations.airport_id.is_none() => {
                    stations.airport_id = first_station_field(group, "icao");
                }
                "pws" if stations.station_id.is_none() => {
                    stations.station_id = first_station_field(group, "id");
                }
                _ => {}
            }
        }
    }

    if stations.airport_id.is_none() && stations.station_id.is_none() {
        return Err(XoapError::NoStationFound);
    }
    Ok(stations)
}

fn first_station_field(group: &Element, field: &str) -> Option<String> {
    group
        .child("station")?
        .text_of(field)
        .filter(|value| !value.is_empty())
}

/// Parse the stage-two observation's flat precipitation fields.
///
/// Missing fields read as zero.
pub fn parse_observation(root: &Element) -> Result<PrecipitationReading> {
    ensure_no_error(root)?;

    let mut reading = PrecipitationReading::default();
    for field in root.children() {
        match field.name() {
            "precip_1hr_in" | "precip_1_hr_in" => reading.last_hour = float(field),
            "precip_today_in" => reading.today = float(field),
            _ => {}
        }
    }
    Ok(reading)
}
