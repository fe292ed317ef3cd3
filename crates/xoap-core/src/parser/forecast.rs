//! Forecast document parser
//!
//! Walks a TWCi `<weather>` document one nesting level at a time. Each level
//! matches its direct children by exact tag name and returns its sub-record
//! by value; the caller composes them into the `Forecast`. Unknown tags and
//! missing optional branches are tolerated, missing numbers read as zero.

use tracing::{debug, warn};

use crate::document::Element;
use crate::error::{Result, XoapError};
use crate::types::{
    is_supported_version, CurrentConditions, Day, FetchDepth, Forecast, Link, SevereAlert,
    UnitLabels, Weather, Wind, MAX_LINKS, SUPPORTED_SCHEMA_VERSION,
};

use super::envelope::ensure_no_error;
use super::{float, int, text};

/// Parse a forecast document for a request made at `depth`.
///
/// The result carries current conditions iff `depth` asked for them and
/// exactly `depth.day_count()` days, each placed at the index its `<day d=..>`
/// element declares.
///
/// # Errors
/// - `XoapError::Api` if the root is a provider error envelope
/// - `XoapError::DocumentParse` if the root is not a `weather` document
/// - `XoapError::IndexOutOfRange` if a day index falls outside the requested days
/// - `XoapError::DocumentParse` if a day element has no numeric index
pub fn parse_forecast(root: &Element, depth: FetchDepth) -> Result<Forecast> {
    ensure_no_error(root)?;
    if !root.is("weather") {
        return Err(XoapError::DocumentParse(format!(
            "expected <weather> root, found <{}>",
            root.name()
        )));
    }

    let schema_version = root.attr("ver").map(str::to_string);
    check_schema_version(schema_version.as_deref());

    let mut units = UnitLabels::default();
    let mut links = Vec::new();
    let mut location = LocationInfo::default();
    let mut alert = None;
    let mut current = None;
    let mut days = vec![Day::default(); depth.day_count()];

    for section in root.children() {
        match section.name() {
            "head" => units = parse_head(section),
            "lnks" => links = parse_links(section),
            "loc" => location = parse_location(section),
            "swa" => alert = parse_alert(section),
            "cc" => current = Some(parse_current(section)),
            "dayf" => parse_days(section, &mut days)?,
            other => debug!(tag = other, "skipping unknown forecast section"),
        }
    }

    let current = if depth.includes_current() {
        let mut conditions = current.unwrap_or_default();
        conditions.alert = alert;
        Some(conditions)
    } else {
        if current.is_some() || alert.is_some() {
            debug!("dropping current conditions the request did not ask for");
        }
        None
    };

    Ok(Forecast {
        links,
        current,
        days,
        location_id: location.id,
        location_name: location.name,
        latitude: location.latitude,
        longitude: location.longitude,
        sunrise: location.sunrise,
        sunset: location.sunset,
        zone: location.zone,
        fetched_at: location.fetched_at,
        units,
        schema_version,
    })
}

fn check_schema_version(found: Option<&str>) {
    if !is_supported_version(found) {
        warn!(
            found = found.unwrap_or("<none>"),
            supported = SUPPORTED_SCHEMA_VERSION,
            "forecast schema version not supported, results may be incomplete"
        );
    }
}

/// `loc` section, spread into the flat `Forecast` fields
#[derive(Debug, Default)]
struct LocationInfo {
    id: String,
    name: String,
    latitude: f32,
    longitude: f32,
    sunrise: String,
    sunset: String,
    zone: i32,
    fetched_at: String,
}

fn parse_head(node: &Element) -> UnitLabels {
    let mut units = UnitLabels::default();
    for child in node.children() {
        match child.name() {
            "locale" => units.locale = text(child),
            "ut" => units.temperature = text(child),
            "ud" => units.distance = text(child),
            "us" => units.speed = text(child),
            "up" => units.precipitation = text(child),
            "ur" => units.pressure = text(child),
            _ => {}
        }
    }
    units
}

fn parse_links(node: &Element) -> Vec<Link> {
    node.children_named("link")
        .take(MAX_LINKS)
        .map(|link| {
            let mut out = Link::default();
            for child in link.children() {
                match child.name() {
                    "l" => out.url = text(child),
                    "t" => out.description = text(child),
                    _ => {}
                }
            }
            out
        })
        .collect()
}

fn parse_location(node: &Element) -> LocationInfo {
    let mut location = LocationInfo {
        id: node.attr("id").unwrap_or_default().to_string(),
        ..LocationInfo::default()
    };
    for child in node.children() {
        match child.name() {
            "dnam" => location.name = text(child),
            "tm" => location.fetched_at = text(child),
            "lat" => location.latitude = float(child),
            "lon" => location.longitude = float(child),
            "sunr" => location.sunrise = text(child),
            "suns" => location.sunset = text(child),
            "zone" => location.zone = int(child),
            _ => {}
        }
    }
    location
}

fn parse_alert(node: &Element) -> Option<SevereAlert> {
    let a = node.child("a")?;
    let mut alert = SevereAlert::default();
    for child in a.children() {
        match child.name() {
            "t" => alert.text = text(child),
            "l" => alert.link = text(child),
            _ => {}
        }
    }
    Some(alert)
}

fn parse_current(node: &Element) -> CurrentConditions {
    let mut cc = CurrentConditions::default();
    for child in node.children() {
        match child.name() {
            "lsup" => cc.last_updated = text(child),
            "obst" => cc.observation_station = text(child),
            "tmp" => cc.temperature = int(child),
            "flik" => cc.feels_like = int(child),
            "t" => cc.condition = text(child),
            "icon" => cc.icon = int(child),
            "hmid" => cc.humidity = int(child),
            "vis" => cc.visibility = float(child),
            "dewp" => cc.dew_point = int(child),
            "bar" => {
                for part in child.children() {
                    match part.name() {
                        "r" => cc.pressure = float(part),
                        "d" => cc.pressure_trend = text(part),
                        _ => {}
                    }
                }
            }
            "uv" => {
                for part in child.children() {
                    match part.name() {
                        "i" => cc.uv_index = float(part),
                        "t" => cc.uv_description = text(part),
                        _ => {}
                    }
                }
            }
            "moon" => {
                for part in child.children() {
                    match part.name() {
                        "icon" => cc.moon_icon = int(part),
                        "t" => cc.moon_phase = text(part),
                        _ => {}
                    }
                }
            }
            "wind" => cc.wind = parse_wind(child),
            _ => {}
        }
    }
    cc
}

fn parse_wind(node: &Element) -> Wind {
    let mut wind = Wind::default();
    for child in node.children() {
        match child.name() {
            "s" => wind.speed = text(child),
            "gust" => wind.gust = text(child),
            "d" => wind.direction = int(child),
            "t" => wind.compass = text(child),
            _ => {}
        }
    }
    wind
}

/// Fill `days` from the `dayf` section, keyed by each day's declared index.
fn parse_days(node: &Element, days: &mut [Day]) -> Result<()> {
    let len = days.len();
    for day in node.children_named("day") {
        let index = day_index(day)?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| days.get_mut(i))
            .ok_or(XoapError::IndexOutOfRange { index, len })?;
        *slot = parse_day(day);
    }
    Ok(())
}

fn day_index(day: &Element) -> Result<i64> {
    let raw = day
        .attr("d")
        .ok_or_else(|| XoapError::DocumentParse("forecast day without index".to_string()))?;
    raw.trim().parse().map_err(|_| {
        XoapError::DocumentParse(format!("forecast day index '{}' is not a number", raw))
    })
}

fn parse_day(node: &Element) -> Day {
    let mut day = Day {
        week_day: node.attr("t").unwrap_or_default().to_string(),
        date: node.attr("dt").unwrap_or_default().to_string(),
        ..Day::default()
    };
    for child in node.children() {
        match child.name() {
            "hi" => day.high = int(child),
            "low" => day.low = int(child),
            "sunr" => day.sunrise = text(child),
            "suns" => day.sunset = text(child),
            "part" => match child.attr("p") {
                Some("d") => day.day = parse_part(child),
                Some("n") => day.night = parse_part(child),
                other => debug!(marker = ?other, "skipping forecast part with unknown marker"),
            },
            _ => {}
        }
    }
    day
}

fn parse_part(node: &Element) -> Weather {
    let mut weather = Weather::default();
    for child in node.children() {
        match child.name() {
            "icon" => weather.icon = int(child),
            "t" => weather.condition = text(child),
            "bt" => weather.condition_short = text(child),
            "ppcp" => weather.precipitation_chance = int(child),
            "hmid" => weather.humidity = int(child),
            "wind" => weather.wind = parse_wind(child),
            _ => {}
        }
    }
    weather
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::error::ApiError;
    use proptest::prelude::*;

    const SAMPLE: &str = include_str!("../../tests/fixtures/forecast_3day.xml");

    fn parse(xml: &str, depth: FetchDepth) -> Result<Forecast> {
        let root = parse_document(xml.as_bytes())?;
        parse_forecast(&root, depth)
    }

    #[test]
    fn test_parse_sample_location_and_units() {
        let forecast = parse(SAMPLE, FetchDepth::Days(3)).unwrap();

        assert_eq!(forecast.location_id, "14623");
        assert_eq!(forecast.location_name, "Rochester, NY (14623)");
        assert_eq!(forecast.latitude, 43.08);
        assert_eq!(forecast.longitude, -77.64);
        assert_eq!(forecast.sunrise, "7:12 AM");
        assert_eq!(forecast.sunset, "6:24 PM");
        assert_eq!(forecast.zone, -4);
        assert_eq!(forecast.fetched_at, "3:42 PM");

        assert_eq!(forecast.units.locale, "en_US");
        assert_eq!(forecast.units.temperature, "F");
        assert_eq!(forecast.units.distance, "mi");
        assert_eq!(forecast.units.speed, "mph");
        assert_eq!(forecast.units.precipitation, "in");
        assert_eq!(forecast.units.pressure, "in");
        assert!(forecast.schema_supported());
    }

    #[test]
    fn test_parse_sample_links() {
        let forecast = parse(SAMPLE, FetchDepth::Days(3)).unwrap();
        assert_eq!(forecast.links.len(), 4);
        assert_eq!(forecast.links[0].description, "Pollen Reports");
        assert_eq!(forecast.links[2].description, "Lawn & Garden");
        assert_eq!(forecast.links[3].url, "http://www.weather.com/drive?par=xoap");
    }

    #[test]
    fn test_parse_sample_current_conditions() {
        let forecast = parse(SAMPLE, FetchDepth::Days(3)).unwrap();
        let cc = forecast.current.unwrap();

        assert_eq!(cc.last_updated, "10/15/10 2:53 PM EDT");
        assert_eq!(cc.observation_station, "Rochester, NY");
        assert_eq!(cc.temperature, 58);
        assert_eq!(cc.feels_like, 55);
        assert_eq!(cc.condition, "Partly Cloudy");
        assert_eq!(cc.icon, 30);
        assert_eq!(cc.humidity, 62);
        assert_eq!(cc.visibility, 10.0);
        assert_eq!(cc.dew_point, 45);
        assert_eq!(cc.pressure, 29.92);
        assert_eq!(cc.pressure_trend, "falling");
        assert_eq!(cc.uv_index, 2.0);
        assert_eq!(cc.uv_description, "Low");
        assert_eq!(cc.moon_icon, 7);
        assert_eq!(cc.moon_phase, "First Quarter");
        assert_eq!(cc.wind.speed, "14");
        assert_eq!(cc.wind.gust, "24");
        assert_eq!(cc.wind.direction, 250);
        assert_eq!(cc.wind.compass, "WSW");

        let alert = cc.alert.unwrap();
        assert_eq!(alert.text, "Wind Advisory");
        assert_eq!(alert.link, "http://www.weather.com/alerts?par=xoap");
    }

    #[test]
    fn test_days_keyed_by_declared_index() {
        // The sample lists day 2 before day 1
        let forecast = parse(SAMPLE, FetchDepth::Days(3)).unwrap();
        assert_eq!(forecast.days.len(), 3);

        let names: Vec<_> = forecast.days.iter().map(|d| d.week_day.as_str()).collect();
        assert_eq!(names, vec!["Friday", "Saturday", "Sunday"]);

        let saturday = &forecast.days[1];
        assert_eq!(saturday.date, "Oct 16");
        assert_eq!(saturday.high, 59);
        assert_eq!(saturday.low, 42);
        assert_eq!(saturday.sunrise, "7:13 AM");
        assert_eq!(saturday.day.precipitation_chance, 40);
        assert_eq!(saturday.day.wind.gust, "29");
        assert_eq!(saturday.night.condition, "Rain");
        assert_eq!(saturday.night.precipitation_chance, 70);
    }

    #[test]
    fn test_day_and_night_parts() {
        let forecast = parse(SAMPLE, FetchDepth::Days(3)).unwrap();
        let sunday = &forecast.days[2];

        assert_eq!(sunday.day.icon, 11);
        assert_eq!(sunday.day.condition, "Showers Early");
        assert_eq!(sunday.day.condition_short, "Shwrs Early");
        assert_eq!(sunday.day.humidity, 80);
        assert_eq!(sunday.day.wind.speed, "calm");
        assert_eq!(sunday.day.wind.speed_value(), 0.0);

        assert_eq!(sunday.night.icon, 27);
        assert_eq!(sunday.night.condition_short, "M Cloudy");
        assert_eq!(sunday.night.wind.direction, 315);
        assert_eq!(sunday.night.wind.compass, "NW");
    }

    #[test]
    fn test_fewer_requested_days_rejects_extra_index() {
        let result = parse(SAMPLE, FetchDepth::Days(2));
        match result {
            Err(XoapError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 2);
                assert_eq!(len, 2);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_more_requested_days_than_returned_defaults_the_rest() {
        let forecast = parse(SAMPLE, FetchDepth::Days(5)).unwrap();
        assert_eq!(forecast.days.len(), 5);
        assert_eq!(forecast.days[3], Day::default());
        assert_eq!(forecast.days[4], Day::default());
    }

    #[test]
    fn test_negative_day_index_is_out_of_range() {
        let xml = r#"<weather ver="2.0"><dayf><day d="-1" t="Friday"/></dayf></weather>"#;
        assert!(matches!(
            parse(xml, FetchDepth::Days(1)),
            Err(XoapError::IndexOutOfRange { index: -1, len: 1 })
        ));
    }

    #[test]
    fn test_day_without_index_is_parse_failure() {
        let xml = r#"<weather ver="2.0"><dayf><day t="Friday"/></dayf></weather>"#;
        assert!(matches!(
            parse(xml, FetchDepth::Days(1)),
            Err(XoapError::DocumentParse(_))
        ));
    }

    #[test]
    fn test_current_only_has_conditions_and_no_days() {
        let xml = r#"<weather ver="2.0"><loc id="X"/><cc><tmp>70</tmp></cc></weather>"#;
        let forecast = parse(xml, FetchDepth::Current).unwrap();
        assert!(forecast.days.is_empty());
        assert_eq!(forecast.current.unwrap().temperature, 70);
    }

    #[test]
    fn test_location_only_has_no_conditions() {
        let xml = SAMPLE
            .replace("<dayf>", "<ignored>")
            .replace("</dayf>", "</ignored>");
        let forecast = parse(&xml, FetchDepth::Location).unwrap();
        assert!(forecast.current.is_none());
        assert!(forecast.days.is_empty());
        assert_eq!(forecast.location_id, "14623");
    }

    #[test]
    fn test_missing_cc_branch_still_yields_conditions() {
        let xml = r#"<weather ver="2.0"><loc id="X"/></weather>"#;
        let forecast = parse(xml, FetchDepth::Current).unwrap();
        assert_eq!(forecast.current, Some(CurrentConditions::default()));
    }

    #[test]
    fn test_missing_humidity_defaults_to_zero() {
        let xml = r#"<weather ver="2.0"><cc><tmp>40</tmp><t>Fog</t></cc></weather>"#;
        let cc = parse(xml, FetchDepth::Current).unwrap().current.unwrap();
        assert_eq!(cc.humidity, 0);
        assert_eq!(cc.temperature, 40);
        assert_eq!(cc.visibility, 0.0);
    }

    #[test]
    fn test_non_numeric_fields_default_to_zero() {
        let xml = r#"<weather ver="2.0"><cc><tmp>N/A</tmp><vis>Unlimited</vis></cc></weather>"#;
        let cc = parse(xml, FetchDepth::Current).unwrap().current.unwrap();
        assert_eq!(cc.temperature, 0);
        assert_eq!(cc.visibility, 0.0);
    }

    #[test]
    fn test_absent_alert_leaves_field_unset() {
        let xml = r#"<weather ver="2.0"><cc><tmp>40</tmp></cc></weather>"#;
        let cc = parse(xml, FetchDepth::Current).unwrap().current.unwrap();
        assert!(cc.alert.is_none());
    }

    #[test]
    fn test_alert_after_cc_is_kept() {
        let xml = r#"<weather ver="2.0"><cc/><swa><a><t>Frost</t><l>x</l></a></swa></weather>"#;
        let cc = parse(xml, FetchDepth::Current).unwrap().current.unwrap();
        assert_eq!(cc.alert.unwrap().text, "Frost");
    }

    #[test]
    fn test_links_capped_at_four() {
        let links: String = (0..6)
            .map(|i| format!("<link><l>u{}</l><t>d{}</t></link>", i, i))
            .collect();
        let xml = format!(r#"<weather ver="2.0"><lnks>{}</lnks></weather>"#, links);
        let forecast = parse(&xml, FetchDepth::Location).unwrap();
        assert_eq!(forecast.links.len(), MAX_LINKS);
        assert_eq!(forecast.links[3].url, "u3");
    }

    #[test]
    fn test_version_mismatch_is_not_fatal() {
        let xml = SAMPLE.replace(r#"ver="2.0""#, r#"ver="3.1""#);
        let forecast = parse(&xml, FetchDepth::Days(3)).unwrap();
        assert_eq!(forecast.schema_version.as_deref(), Some("3.1"));
        assert!(!forecast.schema_supported());
        assert_eq!(forecast.days.len(), 3);
    }

    #[test]
    fn test_tag_matching_is_case_sensitive() {
        let xml = r#"<weather ver="2.0"><CC><tmp>99</tmp></CC></weather>"#;
        let cc = parse(xml, FetchDepth::Current).unwrap().current.unwrap();
        assert_eq!(cc.temperature, 0);
    }

    #[test]
    fn test_foreign_root_is_rejected() {
        let xml = "<html><body>Not Found</body></html>";
        match parse(xml, FetchDepth::Days(2)) {
            Err(XoapError::DocumentParse(msg)) => assert!(msg.contains("<html>")),
            other => panic!("Expected DocumentParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_takes_precedence() {
        let xml = include_str!("../../tests/fixtures/error_license.xml");
        assert!(matches!(
            parse(xml, FetchDepth::Days(1)),
            Err(XoapError::Api(ApiError::InvalidLicenseKey))
        ));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let first = parse(SAMPLE, FetchDepth::Days(3)).unwrap();
        let second = parse(SAMPLE, FetchDepth::Days(3)).unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_day_list_matches_requested_depth(requested in 1u8..=5, index in 0i64..8) {
            let xml = format!(
                r#"<weather ver="2.0"><dayf><day d="{}" t="Day{}"><hi>50</hi></day></dayf></weather>"#,
                index, index
            );
            let result = parse(&xml, FetchDepth::Days(requested));
            if index < i64::from(requested) {
                let forecast = result.unwrap();
                prop_assert_eq!(forecast.days.len(), usize::from(requested));
                let expected = format!("Day{}", index);
                let slot = usize::try_from(index).unwrap();
                prop_assert_eq!(forecast.days[slot].week_day.as_str(), expected.as_str());
                prop_assert_eq!(forecast.days[slot].high, 50);
            } else {
                let is_out_of_range = matches!(result, Err(XoapError::IndexOutOfRange { .. }));
                prop_assert!(is_out_of_range);
            }
        }
    }
}
