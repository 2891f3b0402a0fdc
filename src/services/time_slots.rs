use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::CalendarError;

// "9:00 AM", "1:30pm", "12:00 PM". Only the shape is checked here.
static TIME_LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2}):([0-9]{2})\s*(AM|PM)$").expect("valid time label regex")
});

/// Format used for every UTC timestamp in calendar exports
pub const UTC_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Split a display time label into a 24-hour `(hour, minute)` pair.
///
/// The label must look like `H:MM AM` or `HH:MM PM` (case-insensitive, the
/// space before the meridiem is optional). Values are not range-checked:
/// `"25:00 AM"` yields `(25, 0)` and is rolled forward by the caller.
pub fn parse_label_clock(label: &str) -> Result<(u32, u32), CalendarError> {
    let captures = TIME_LABEL_PATTERN
        .captures(label)
        .ok_or_else(|| CalendarError::InvalidTimeFormat(label.to_string()))?;

    // Both groups are at most two ASCII digits so these cannot overflow
    let mut hour: u32 = captures[1]
        .parse()
        .map_err(|_| CalendarError::InvalidTimeFormat(label.to_string()))?;
    let minute: u32 = captures[2]
        .parse()
        .map_err(|_| CalendarError::InvalidTimeFormat(label.to_string()))?;
    let is_pm = captures[3].eq_ignore_ascii_case("PM");

    // Convert to 24-hour format
    if is_pm && hour < 12 {
        hour += 12;
    } else if !is_pm && hour == 12 {
        hour = 0;
    }

    Ok((hour, minute))
}

/// Combine a calendar date and a display time label in the given time zone.
///
/// Only hour and minute come from the label; seconds and sub-seconds are
/// zero and the date is used verbatim. Out-of-range clock values roll forward
/// into the following day(s).
///
/// # Errors
/// - `InvalidTimeFormat` when the label does not match `H:MM AM|PM`.
/// - `NonexistentLocalTime` when the wall-clock time falls in a DST gap.
///   Ambiguous wall-clock times (DST overlap) resolve to the earlier instant.
pub fn parse_time_slot_label_in<Tz: TimeZone>(
    date: NaiveDate,
    label: &str,
    tz: &Tz,
) -> Result<DateTime<Tz>, CalendarError> {
    let (hour, minute) = parse_label_clock(label)?;

    let naive: NaiveDateTime = date.and_time(NaiveTime::MIN)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute));

    debug!("Time label {:?} on {} resolved to wall clock {}", label, date, naive);

    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or(CalendarError::NonexistentLocalTime(naive))
}

/// Combine a calendar date and a display time label in the host's local zone
pub fn parse_time_slot_label(
    date: NaiveDate,
    label: &str,
) -> Result<DateTime<Local>, CalendarError> {
    parse_time_slot_label_in(date, label, &Local)
}

// Start plus a number of minutes, crossing midnight as needed.
// The duration is not validated here.
pub fn compute_end_instant<Tz: TimeZone>(start: &DateTime<Tz>, duration_minutes: i64) -> DateTime<Tz> {
    start.clone() + Duration::minutes(duration_minutes)
}

/// Render an instant as a UTC calendar timestamp, e.g. `20240610T143000Z`.
///
/// The instant is converted to UTC first, so the `Z` suffix is always truthful.
pub fn format_utc_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .format(UTC_TIMESTAMP_FORMAT)
        .to_string()
}

// Minutes since midnight for a label, None if the label does not parse
pub fn label_minutes_of_day(label: &str) -> Option<u32> {
    parse_label_clock(label)
        .ok()
        .map(|(hour, minute)| hour * 60 + minute)
}

/// Order display labels by the time of day they denote and drop duplicates.
///
/// Plain string sorting puts "10:00 AM" before "9:00 AM" and "1:30 PM" before
/// "11:00 AM"; this sorts on the parsed clock instead. Labels that fail to
/// parse are kept at the end in string order.
pub fn sort_time_slot_labels(mut labels: Vec<String>) -> Vec<String> {
    for label in &labels {
        if label_minutes_of_day(label).is_none() {
            warn!("Availability returned an unparseable time label: {:?}", label);
        }
    }

    labels.sort_by(|a, b| {
        let key_a = label_minutes_of_day(a).unwrap_or(u32::MAX);
        let key_b = label_minutes_of_day(b).unwrap_or(u32::MAX);
        key_a.cmp(&key_b).then_with(|| a.cmp(b))
    });
    labels.dedup();

    labels
}
