//! Request URL construction
//!
//! Maps an endpoint plus session state onto a request URL. Every user- or
//! provider-supplied component is percent-encoded and the URL grows to
//! whatever length its components need.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::types::{FetchDepth, Unit};

/// TWCi location search
const TWCI_SEARCH_URL: &str = "http://xoap.weather.com/search/search";

/// TWCi local weather, one path segment per location id
const TWCI_WEATHER_URL: &str = "http://xoap.weather.com/weather/local";

/// Weather Underground geo lookup listing nearby stations
const WU_LOOKUP_URL: &str = "http://api.wunderground.com/auto/wui/geo/GeoLookupXML/index.xml";

/// Weather Underground personal weather station observation
const WU_STATION_URL: &str = "http://api.wunderground.com/weatherstation/WXCurrentObXML.asp";

/// Weather Underground airport observation
const WU_AIRPORT_URL: &str = "http://api.wunderground.com/auto/wui/geo/WXCurrentObXML/index.xml";

const REDACTED: &str = "***";

/// Base URLs of the provider endpoints
///
/// Defaults point at the public feeds; tests point them at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedUrls {
    pub search: String,
    pub weather: String,
    pub station_lookup: String,
    pub station_observation: String,
    pub airport_observation: String,
}

impl Default for FeedUrls {
    fn default() -> Self {
        Self {
            search: TWCI_SEARCH_URL.to_string(),
            weather: TWCI_WEATHER_URL.to_string(),
            station_lookup: WU_LOOKUP_URL.to_string(),
            station_observation: WU_STATION_URL.to_string(),
            airport_observation: WU_AIRPORT_URL.to_string(),
        }
    }
}

impl FeedUrls {
    /// Point every endpoint at `base`, keeping the provider paths.
    ///
    /// # Example
    /// ```
    /// use xoap_core::FeedUrls;
    ///
    /// let urls = FeedUrls::with_base("http://127.0.0.1:8080");
    /// assert_eq!(urls.search, "http://127.0.0.1:8080/search/search");
    /// ```
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            search: format!("{}/search/search", base),
            weather: format!("{}/weather/local", base),
            station_lookup: format!("{}/auto/wui/geo/GeoLookupXML/index.xml", base),
            station_observation: format!("{}/weatherstation/WXCurrentObXML.asp", base),
            airport_observation: format!("{}/auto/wui/geo/WXCurrentObXML/index.xml", base),
        }
    }

    /// Build the request URL for `endpoint`.
    pub fn build(&self, endpoint: &Endpoint<'_>) -> String {
        self.render(endpoint, false)
    }

    /// Build the request URL with credentials masked, for logging.
    pub fn build_redacted(&self, endpoint: &Endpoint<'_>) -> String {
        self.render(endpoint, true)
    }

    fn render(&self, endpoint: &Endpoint<'_>, redact: bool) -> String {
        match endpoint {
            Endpoint::Search { query } => {
                format!("{}?where={}", trim(&self.search), urlencoding::encode(query))
            }
            Endpoint::Forecast {
                location_id,
                depth,
                partner_id,
                license_key,
                unit,
            } => {
                let mut url = format!(
                    "{}/{}?",
                    trim(&self.weather),
                    urlencoding::encode(location_id)
                );
                if depth.includes_current() {
                    url.push_str("cc=*&");
                }
                if let FetchDepth::Days(n) = depth {
                    url.push_str(&format!("dayf={}&", n));
                }
                let (partner, key) = if redact {
                    (Cow::Borrowed(REDACTED), Cow::Borrowed(REDACTED))
                } else {
                    (urlencoding::encode(partner_id), urlencoding::encode(license_key))
                };
                url.push_str(&format!(
                    "link=xoap&prod=xoap&par={}&key={}&unit={}",
                    partner,
                    key,
                    unit.code()
                ));
                url
            }
            Endpoint::RainStationLookup { query } => format!(
                "{}?query={}",
                trim(&self.station_lookup),
                urlencoding::encode(query)
            ),
            Endpoint::RainObservation { station_id } => format!(
                "{}?ID={}",
                trim(&self.station_observation),
                urlencoding::encode(station_id)
            ),
            Endpoint::AirportObservation { airport_id } => format!(
                "{}?query={}",
                trim(&self.airport_observation),
                urlencoding::encode(airport_id)
            ),
        }
    }
}

fn trim(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// A provider request, carrying the components its URL needs
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'a> {
    /// Free-text location search
    Search { query: &'a str },
    /// Forecast for one location
    Forecast {
        location_id: &'a str,
        depth: FetchDepth,
        partner_id: &'a str,
        license_key: &'a str,
        unit: Unit,
    },
    /// Nearby station discovery for the rain gauge
    RainStationLookup { query: &'a str },
    /// Current observation of a personal weather station
    RainObservation { station_id: &'a str },
    /// Current observation of an airport station
    AirportObservation { airport_id: &'a str },
}
