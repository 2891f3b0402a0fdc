//! iCalendar (.ics) generation for confirmed meetings.
//!
//! The output is a fixed 14-line `VCALENDAR` holding a single `VEVENT`.
//! Lines are never folded and are joined with CRLF as calendar importers
//! expect.

use chrono::{DateTime, TimeZone, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tracing::debug;

use crate::models::meeting::MeetingRecord;
use crate::services::time_slots::{compute_end_instant, format_utc_timestamp};

pub const ICS_PRODUCT_ID: &str = "-//BookSync//EN";
pub const ICS_UID_DOMAIN: &str = "booksync.com";
pub const ICS_LINE_ENDING: &str = "\r\n";
pub const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub const DEFAULT_ICS_FILENAME: &str = "meeting.ics";
pub const APPLE_ICS_FILENAME: &str = "apple-calendar-event.ics";

const UID_TOKEN_LEN: usize = 16;

/// Generate a fresh event UID such as `k3v9x0q2m1c8z7w4@booksync.com`
pub fn generate_uid() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UID_TOKEN_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("{}@{}", token, ICS_UID_DOMAIN)
}

// Literal line breaks become the two-character sequence `\n` so every
// property stays on one physical line
fn escape_line_breaks(value: &str) -> String {
    value.replace("\r\n", "\n").replace(['\r', '\n'], "\\n")
}

/// Serialize a meeting with an explicit DTSTAMP and UID.
///
/// Deterministic counterpart of [`serialize_to_ics`].
pub fn render_ics<Tz: TimeZone>(
    meeting: &MeetingRecord<Tz>,
    dtstamp: DateTime<Utc>,
    uid: &str,
) -> String {
    let end = compute_end_instant(&meeting.start, i64::from(meeting.duration_minutes));

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", ICS_PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("SUMMARY:{}", escape_line_breaks(&meeting.title)),
        format!("DTSTART:{}", format_utc_timestamp(&meeting.start)),
        format!("DTEND:{}", format_utc_timestamp(&end)),
        format!("DESCRIPTION:{}", escape_line_breaks(&meeting.description)),
        format!("LOCATION:{}", escape_line_breaks(&meeting.location)),
        format!("DTSTAMP:{}", format_utc_timestamp(&dtstamp)),
        format!("UID:{}", uid),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    lines.join(ICS_LINE_ENDING)
}

/// Serialize a meeting to an .ics document.
///
/// DTSTAMP is the current time and UID is random, so two calls for the same
/// meeting differ in exactly those two lines.
pub fn serialize_to_ics<Tz: TimeZone>(meeting: &MeetingRecord<Tz>) -> String {
    let uid = generate_uid();
    debug!("Serializing meeting {:?} to ICS with UID {}", meeting.title, uid);
    render_ics(meeting, Utc::now(), &uid)
}
