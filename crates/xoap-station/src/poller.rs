//! One weather update cycle
//!
//! Fetches the forecast (and optionally the rain gauge) through a session
//! and publishes the values into a `PointTable`. A failed forecast leaves
//! every point untouched; a failed rain lookup only skips the rain points.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{info, instrument, warn};

use xoap_core::points::point;
use xoap_core::{
    publish_forecast, publish_rain, ClientConfig, FetchDepth, SensorSink, SessionOption, Unit,
    WeatherSession, XoapError,
};

use crate::config::StationConfig;
use crate::PointTable;

/// Options the station adds on top of its configuration file
#[derive(Debug, Clone, Default)]
pub struct StationOptions {
    pub unit: Unit,
    pub client: ClientConfig,
}

/// Create a session configured from the station file.
///
/// # Errors
/// `XoapError::MissingCredential` or `XoapError::InvalidOption` when the
/// configuration values are rejected by the session.
pub fn open_session(
    config: &StationConfig,
    options: &StationOptions,
) -> Result<WeatherSession, XoapError> {
    let mut session = WeatherSession::with_config(
        &config.partner_id,
        &config.license_key,
        options.client.clone(),
    )?;
    session.set_option(SessionOption::LocationId(config.location_id.clone()))?;
    session.set_option(SessionOption::Unit(options.unit))?;
    session.set_option(SessionOption::Fetch(FetchDepth::days(config.forecast_days)?))?;
    Ok(session)
}

/// Run one update cycle.
///
/// On success the update time points (12-16) are set from `now`.
///
/// # Errors
/// Returns the forecast error; rain errors are logged and do not fail the cycle.
#[instrument(skip_all)]
pub async fn update_weather(
    session: &WeatherSession,
    points: &mut PointTable,
    include_rain: bool,
    now: NaiveDateTime,
) -> Result<(), XoapError> {
    let forecast = session.fetch_forecast().await?;
    publish_forecast(&forecast, points);

    if include_rain {
        match session.fetch_rain().await {
            Ok(rain) => publish_rain(&rain, points),
            Err(e) => warn!(error = %e, "rain update failed, keeping previous rain points"),
        }
    }

    publish_update_time(now, points);
    info!(points = points.len(), "weather updated");
    Ok(())
}

fn publish_update_time<S>(now: NaiveDateTime, sink: &mut S)
where
    S: SensorSink + ?Sized,
{
    sink.set_value(point::UPDATE_HOUR, now.hour() as f32);
    sink.set_value(point::UPDATE_MINUTE, now.minute() as f32);
    sink.set_value(point::UPDATE_MONTH, now.month0() as f32);
    sink.set_value(point::UPDATE_DAY, now.day() as f32);
    sink.set_value(point::UPDATE_YEAR, now.year() as f32);
}
