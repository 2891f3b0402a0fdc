use chrono::{DateTime, TimeZone};
use url::form_urlencoded;

use crate::models::meeting::MeetingRecord;
use crate::services::time_slots::format_utc_timestamp;

pub const GOOGLE_CALENDAR_RENDER_URL: &str = "https://calendar.google.com/calendar/render";

/// Build a Google Calendar "add event" link for a meeting.
///
/// Query values use form encoding (spaces become `+`, `/` becomes `%2F`),
/// matching what a browser's `URLSearchParams` produces. Nothing is fetched
/// or opened here.
pub fn build_provider_deep_link<Tz: TimeZone, Tz2: TimeZone>(
    meeting: &MeetingRecord<Tz>,
    end: &DateTime<Tz2>,
) -> String {
    let dates = format!(
        "{}/{}",
        format_utc_timestamp(&meeting.start),
        format_utc_timestamp(end)
    );

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &meeting.title)
        .append_pair("dates", &dates)
        .append_pair("details", &meeting.description)
        .append_pair("location", &meeting.location)
        .finish();

    format!("{}?{}", GOOGLE_CALENDAR_RENDER_URL, query)
}
