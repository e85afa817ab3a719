//! Timestamp parsing for query windows

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Date-time layouts down to the minute or finer, extended and basic
const LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Layouts that stop at the hour; minutes are taken as zero
const HOUR_LAYOUTS: &[&str] = &["%Y-%m-%dT%H", "%Y%m%dT%H"];

/// Date-only layouts, read as midnight
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Trailing offset accepted after any date-time layout (`+hh`, `+hhmm`, `+hh:mm`)
const OFFSET_SUFFIX: &str = "%#z";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not an ISO-8601 date or date-time")]
pub struct TimeParseError(pub String);

/// Parse an ISO-8601 date or date-time and pin it to UTC.
///
/// Any offset embedded in the value is dropped: the wall-clock reading is
/// taken as-is and labelled UTC, it is not converted. A bare date means
/// midnight.
pub fn parse_utc_override(value: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Utc.from_utc_datetime(&dt.naive_local()));
    }

    let date_times = LAYOUTS
        .iter()
        .map(|layout| (*layout, false))
        .chain(HOUR_LAYOUTS.iter().map(|layout| (*layout, true)));

    for (layout, hour_only) in date_times {
        let with_offset = format!("{}{}", layout, OFFSET_SUFFIX);
        for candidate in [layout, with_offset.as_str()] {
            if let Some(naive) = parse_wall_clock(value, candidate, hour_only) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }

    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(value, layout) {
            return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    Err(TimeParseError(value.to_string()))
}

/// Local date-time of `value` under `layout`, ignoring any parsed offset
fn parse_wall_clock(value: &str, layout: &str, hour_only: bool) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, value, StrftimeItems::new(layout)).ok()?;
    if hour_only {
        parsed.set_minute(0).ok()?;
    }
    parsed.to_naive_datetime_with_offset(0).ok()
}
