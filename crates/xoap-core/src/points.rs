//! Sensor-point mapping
//!
//! Writes forecast and rain values into the numbered point slots of a
//! consuming device. Points 12-16 (time of the last successful update) are
//! left to the caller.

use crate::types::{Forecast, Rain};

/// Point indices written by `publish_forecast` and `publish_rain`
pub mod point {
    pub const TEMPERATURE: u32 = 0;
    pub const FEELS_LIKE: u32 = 1;
    pub const HUMIDITY: u32 = 2;
    pub const VISIBILITY: u32 = 3;
    pub const DEW_POINT: u32 = 4;
    pub const PRESSURE: u32 = 5;
    pub const UV_INDEX: u32 = 6;
    pub const WIND_SPEED: u32 = 7;
    pub const WIND_GUST: u32 = 8;
    pub const WIND_DIRECTION: u32 = 9;
    pub const RAIN_TODAY: u32 = 10;
    pub const RAIN_LAST_HOUR: u32 = 11;
    pub const UPDATE_HOUR: u32 = 12;
    pub const UPDATE_MINUTE: u32 = 13;
    /// Zero-based month
    pub const UPDATE_MONTH: u32 = 14;
    pub const UPDATE_DAY: u32 = 15;
    pub const UPDATE_YEAR: u32 = 16;

    /// First point of forecast day 0
    pub const FIRST_DAY: u32 = 17;
    /// Points per forecast day
    pub const PER_DAY: u32 = 6;

    // Offsets within one forecast day
    pub const DAY_HIGH: u32 = 0;
    pub const DAY_LOW: u32 = 1;
    pub const DAY_PRECIPITATION: u32 = 2;
    pub const NIGHT_PRECIPITATION: u32 = 3;
    pub const DAY_WIND_SPEED: u32 = 4;
    pub const NIGHT_WIND_SPEED: u32 = 5;

    /// Index of `offset` within forecast day `day`.
    pub fn for_day(day: u32, offset: u32) -> u32 {
        FIRST_DAY + PER_DAY * day + offset
    }
}

/// Destination of published values, e.g. a device's analog inputs
pub trait SensorSink {
    fn set_value(&mut self, index: u32, value: f32);
}

/// Write current conditions (points 0-9) and every forecast day.
///
/// Current-condition points are skipped when the forecast carries none, so
/// the sink keeps its previous values.
pub fn publish_forecast<S>(forecast: &Forecast, sink: &mut S)
where
    S: SensorSink + ?Sized,
{
    if let Some(cc) = &forecast.current {
        sink.set_value(point::TEMPERATURE, cc.temperature as f32);
        sink.set_value(point::FEELS_LIKE, cc.feels_like as f32);
        sink.set_value(point::HUMIDITY, cc.humidity as f32);
        sink.set_value(point::VISIBILITY, cc.visibility);
        sink.set_value(point::DEW_POINT, cc.dew_point as f32);
        sink.set_value(point::PRESSURE, cc.pressure);
        sink.set_value(point::UV_INDEX, cc.uv_index);
        sink.set_value(point::WIND_SPEED, cc.wind.speed_value());
        sink.set_value(point::WIND_GUST, cc.wind.gust_value());
        sink.set_value(point::WIND_DIRECTION, cc.wind.direction as f32);
    }

    for (i, day) in (0u32..).zip(&forecast.days) {
        sink.set_value(point::for_day(i, point::DAY_HIGH), day.high as f32);
        sink.set_value(point::for_day(i, point::DAY_LOW), day.low as f32);
        sink.set_value(
            point::for_day(i, point::DAY_PRECIPITATION),
            day.day.precipitation_chance as f32,
        );
        sink.set_value(
            point::for_day(i, point::NIGHT_PRECIPITATION),
            day.night.precipitation_chance as f32,
        );
        sink.set_value(
            point::for_day(i, point::DAY_WIND_SPEED),
            day.day.wind.speed_value(),
        );
        sink.set_value(
            point::for_day(i, point::NIGHT_WIND_SPEED),
            day.night.wind.speed_value(),
        );
    }
}

/// Write rain today (point 10) and rain in the last hour (point 11).
pub fn publish_rain<S>(rain: &Rain, sink: &mut S)
where
    S: SensorSink + ?Sized,
{
    sink.set_value(point::RAIN_TODAY, rain.rain_today);
    sink.set_value(point::RAIN_LAST_HOUR, rain.rain_last_hour);
}
