//! Weather session API
//!
//! A `WeatherSession` owns the partner credentials, the per-request options
//! and its own HTTP client. Every fetch builds a URL from the session state,
//! performs the round trip, classifies the response and runs the matching
//! extractor. Fetches only read the session; `set_option` and `release` are
//! the only mutators.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use crate::client::{ClientConfig, FeedClient};
use crate::document::{parse_document, Element};
use crate::endpoint::Endpoint;
use crate::error::{Result, TransportFailure, XoapError};
use crate::parser::{
    classify, parse_forecast, parse_locations, parse_observation, parse_station_lookup,
    ObservationTarget,
};
use crate::types::{FetchDepth, Forecast, LocationCandidate, Rain, Unit};

/// A session option together with its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOption {
    /// Provider location id, e.g. a zip code or `USNY1232`
    LocationId(String),
    /// Unit system of the returned values
    Unit(Unit),
    /// How much of the forecast to request
    Fetch(FetchDepth),
}

/// Session handle for the XOAP feeds
///
/// # Example
/// ```no_run
/// use xoap_core::{FetchDepth, SessionOption, WeatherSession};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut session = WeatherSession::new("1004124588", "079f24145f208494")?;
///     session.set_option(SessionOption::LocationId("14623".to_string()))?;
///     session.set_option(SessionOption::Fetch(FetchDepth::Days(3)))?;
///
///     let forecast = session.fetch_forecast().await?;
///     println!("{}: {} days", forecast.location_name, forecast.days.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct WeatherSession {
    partner_id: Option<SecretString>,
    license_key: Option<SecretString>,
    location_id: Option<String>,
    unit: Unit,
    depth: FetchDepth,
    deadline: Duration,
    client: Option<FeedClient>,
}

impl WeatherSession {
    /// Create a session with the default client configuration.
    ///
    /// # Arguments
    /// * `partner_id` - Partner id issued by the provider
    /// * `license_key` - License key issued by the provider
    ///
    /// # Errors
    /// - `XoapError::MissingCredential` if either credential is empty
    /// - `XoapError::Transport` if the HTTP client cannot be created
    pub fn new(partner_id: &str, license_key: &str) -> Result<Self> {
        Self::with_config(partner_id, license_key, ClientConfig::default())
    }

    /// Create a session with a custom client configuration.
    ///
    /// Used by tests to point the session at a mock server.
    pub fn with_config(partner_id: &str, license_key: &str, config: ClientConfig) -> Result<Self> {
        let partner_id = partner_id.trim();
        let license_key = license_key.trim();
        if partner_id.is_empty() {
            return Err(XoapError::MissingCredential("partner id"));
        }
        if license_key.is_empty() {
            return Err(XoapError::MissingCredential("license key"));
        }

        let client = FeedClient::with_config(config)?;
        Ok(Self {
            partner_id: Some(SecretString::from(partner_id)),
            license_key: Some(SecretString::from(license_key)),
            location_id: None,
            unit: Unit::default(),
            depth: FetchDepth::default(),
            deadline: client.default_deadline(),
            client: Some(client),
        })
    }

    /// Override the deadline applied to each network round trip.
    ///
    /// The deadline may be longer or shorter than the client's default.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Change one session option.
    ///
    /// The session is left untouched when the value is rejected.
    ///
    /// # Errors
    /// `XoapError::InvalidOption` for an empty location id or a day count
    /// outside 1-5.
    pub fn set_option(&mut self, option: SessionOption) -> Result<()> {
        match option {
            SessionOption::LocationId(id) => {
                let id = id.trim();
                if id.is_empty() {
                    return Err(XoapError::InvalidOption(
                        "location id cannot be empty".to_string(),
                    ));
                }
                self.location_id = Some(id.to_string());
            }
            SessionOption::Unit(unit) => self.unit = unit,
            SessionOption::Fetch(FetchDepth::Days(n)) => self.depth = FetchDepth::days(n)?,
            SessionOption::Fetch(depth) => self.depth = depth,
        }
        Ok(())
    }

    /// Change one session option given by name, as read from a text source.
    ///
    /// Recognized names: `location`, `unit`, `fetch`.
    ///
    /// # Errors
    /// `XoapError::InvalidOption` for an unknown name or an unparseable value.
    pub fn set_option_raw(&mut self, name: &str, value: &str) -> Result<()> {
        let option = match name.trim().to_ascii_lowercase().as_str() {
            "location" | "location_id" | "locid" => SessionOption::LocationId(value.to_string()),
            "unit" => SessionOption::Unit(value.parse()?),
            "fetch" | "depth" => SessionOption::Fetch(value.parse()?),
            other => {
                return Err(XoapError::InvalidOption(format!("unknown option '{}'", other)));
            }
        };
        self.set_option(option)
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn depth(&self) -> FetchDepth {
        self.depth
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Whether `release` has been called.
    pub fn is_released(&self) -> bool {
        self.client.is_none()
    }

    /// Drop the credentials and the HTTP client.
    ///
    /// Calling it again is a no-op. Every later fetch fails with
    /// `XoapError::MissingCredential`.
    pub fn release(&mut self) {
        if self.client.take().is_some() {
            debug!("session released");
        }
        self.partner_id = None;
        self.license_key = None;
    }

    /// Search for locations matching free text.
    ///
    /// # Returns
    /// * `Ok(Vec<LocationCandidate>)` in provider order, possibly empty
    /// * `Err(XoapError::InvalidOption)` if the query is empty or whitespace-only
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>> {
        self.credentials()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(XoapError::InvalidOption(
                "search query cannot be empty".to_string(),
            ));
        }

        let root = self.fetch_document(&Endpoint::Search { query }).await?;
        let candidates = parse_locations(&root)?;
        info!(count = candidates.len(), "search complete");
        Ok(candidates)
    }

    /// Fetch the forecast for the session's location at the session's depth.
    ///
    /// # Errors
    /// - `XoapError::MissingCredential` after `release`
    /// - `XoapError::MissingLocation` if no location id was set
    /// - `XoapError::Transport`, `XoapError::DocumentParse`, `XoapError::Api`
    /// - `XoapError::IndexOutOfRange` if the response declares a day beyond the requested depth
    #[instrument(skip(self))]
    pub async fn fetch_forecast(&self) -> Result<Forecast> {
        let (partner_id, license_key) = self.credentials()?;
        let location_id = self.location()?;

        let endpoint = Endpoint::Forecast {
            location_id,
            depth: self.depth,
            partner_id,
            license_key,
            unit: self.unit,
        };
        let root = self.fetch_document(&endpoint).await?;
        let forecast = parse_forecast(&root, self.depth)?;
        info!(
            location = %forecast.location_name,
            days = forecast.days.len(),
            "forecast fetched"
        );
        Ok(forecast)
    }

    /// Fetch rain accumulation from the station nearest the session's location.
    ///
    /// Two round trips: the station lookup, then the observation of the
    /// personal weather station it lists (or the airport when no personal
    /// station is listed). A failed lookup never issues the second request.
    ///
    /// # Errors
    /// - `XoapError::NoStationFound` if the lookup lists no station
    /// - any error of either round trip
    #[instrument(skip(self))]
    pub async fn fetch_rain(&self) -> Result<Rain> {
        self.credentials()?;
        let location_id = self.location()?;

        let stations = {
            let root = self
                .fetch_document(&Endpoint::RainStationLookup { query: location_id })
                .await?;
            parse_station_lookup(&root)?
        };

        let endpoint = match stations.observation_target() {
            Some(ObservationTarget::Personal(station_id)) => {
                Endpoint::RainObservation { station_id }
            }
            Some(ObservationTarget::Airport(airport_id)) => {
                Endpoint::AirportObservation { airport_id }
            }
            None => return Err(XoapError::NoStationFound),
        };
        let reading = {
            let root = self.fetch_document(&endpoint).await?;
            parse_observation(&root)?
        };

        info!(
            last_hour = reading.last_hour,
            today = reading.today,
            "rain fetched"
        );
        Ok(Rain {
            rain_last_hour: reading.last_hour,
            rain_today: reading.today,
            raining: reading.last_hour > 0.0,
            airport_id: stations.airport_id,
            station_id: stations.station_id,
        })
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let partner_id = self
            .partner_id
            .as_ref()
            .ok_or(XoapError::MissingCredential("partner id"))?;
        let license_key = self
            .license_key
            .as_ref()
            .ok_or(XoapError::MissingCredential("license key"))?;
        Ok((partner_id.expose_secret(), license_key.expose_secret()))
    }

    fn location(&self) -> Result<&str> {
        self.location_id.as_deref().ok_or(XoapError::MissingLocation)
    }

    async fn fetch_document(&self, endpoint: &Endpoint<'_>) -> Result<Element> {
        let client = self
            .client
            .as_ref()
            .ok_or(XoapError::MissingCredential("session released"))?;
        let urls = client.urls();
        debug!(url = %urls.build_redacted(endpoint), "fetching");

        let response = client.fetch_bytes(&urls.build(endpoint), self.deadline).await?;
        if response.is_success() {
            return parse_document(&response.body);
        }

        // A non-success body only counts when it is a provider error envelope
        let failure = TransportFailure::Status(response.status);
        let root = parse_document(&response.body).map_err(|_| failure.clone())?;
        match classify(&root) {
            Some(error) => Err(error.into()),
            None => {
                warn!(
                    status = response.status,
                    root = root.name(),
                    "error page is not a provider envelope"
                );
                Err(failure.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FeedUrls;

    fn session() -> WeatherSession {
        WeatherSession::new("1004124588", "079f24145f208494").unwrap()
    }

    fn unreachable_session() -> WeatherSession {
        let config = ClientConfig {
            urls: FeedUrls::with_base("http://127.0.0.1:9"),
            ..ClientConfig::default()
        };
        WeatherSession::with_config("pid", "key", config)
            .unwrap()
            .with_deadline(Duration::from_secs(2))
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.location_id(), None);
        assert_eq!(session.unit(), Unit::Standard);
        assert_eq!(session.depth(), FetchDepth::Location);
        assert_eq!(session.deadline(), Duration::from_secs(30));
        assert!(!session.is_released());
    }

    #[test]
    fn test_missing_credentials() {
        match WeatherSession::new("", "key") {
            Err(XoapError::MissingCredential(which)) => assert_eq!(which, "partner id"),
            other => panic!("Expected MissingCredential error, got {:?}", other),
        }
        match WeatherSession::new("pid", "   ") {
            Err(XoapError::MissingCredential(which)) => assert_eq!(which, "license key"),
            other => panic!("Expected MissingCredential error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_output_hides_credentials() {
        let output = format!("{:?}", session());
        assert!(!output.contains("1004124588"));
        assert!(!output.contains("079f24145f208494"));
    }

    #[test]
    fn test_set_options() {
        let mut session = session();
        session
            .set_option(SessionOption::LocationId(" 14623 ".to_string()))
            .unwrap();
        session.set_option(SessionOption::Unit(Unit::Metric)).unwrap();
        session
            .set_option(SessionOption::Fetch(FetchDepth::Days(5)))
            .unwrap();

        assert_eq!(session.location_id(), Some("14623"));
        assert_eq!(session.unit(), Unit::Metric);
        assert_eq!(session.depth(), FetchDepth::Days(5));
    }

    #[test]
    fn test_rejected_option_leaves_state_unchanged() {
        let mut session = session();
        session.set_option_raw("location", "USNY1232").unwrap();
        session.set_option_raw("unit", "m").unwrap();
        session.set_option_raw("fetch", "3").unwrap();
        let before = (
            session.location_id().map(str::to_string),
            session.unit(),
            session.depth(),
        );

        for (name, value) in [
            ("colour", "blue"),
            ("unit", "kelvin"),
            ("fetch", "9"),
            ("fetch", "0"),
            ("location", "  "),
        ] {
            assert!(matches!(
                session.set_option_raw(name, value),
                Err(XoapError::InvalidOption(_))
            ));
        }
        assert!(matches!(
            session.set_option(SessionOption::Fetch(FetchDepth::Days(6))),
            Err(XoapError::InvalidOption(_))
        ));

        let after = (
            session.location_id().map(str::to_string),
            session.unit(),
            session.depth(),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut session = session();
        session.release();
        assert!(session.is_released());
        session.release();
        assert!(session.is_released());
        assert!(matches!(
            session.credentials(),
            Err(XoapError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_after_release() {
        let mut session = session();
        session.set_option_raw("location", "14623").unwrap();
        session.release();

        assert!(matches!(
            session.fetch_forecast().await,
            Err(XoapError::MissingCredential(_))
        ));
        assert!(matches!(
            session.fetch_rain().await,
            Err(XoapError::MissingCredential(_))
        ));
        assert!(matches!(
            session.search("Rochester").await,
            Err(XoapError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_without_location() {
        let session = session();
        assert!(matches!(
            session.fetch_forecast().await,
            Err(XoapError::MissingLocation)
        ));
        assert!(matches!(
            session.fetch_rain().await,
            Err(XoapError::MissingLocation)
        ));
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let session = session();
        match session.search("   ").await {
            Err(XoapError::InvalidOption(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected InvalidOption error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_failure() {
        let mut session = unreachable_session();
        session.set_option_raw("location", "14623").unwrap();
        assert!(matches!(
            session.fetch_forecast().await,
            Err(XoapError::Transport(_))
        ));
    }
}
