use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::models::booking::{Booking, NewBooking};
use crate::models::calendar::{AddToCalendar, CalendarConnection, CalendarProvider};
use crate::models::form::{validate_contact, BookingForm, VISITOR_MIN_NAME_LEN};
use crate::models::meeting::{find_meeting_type, MeetingRecord, MeetingType};
use crate::services::calendar::{build_calendar_event, CalendarService};
use crate::services::calendar_links::build_provider_deep_link;
use crate::services::database::BookingStore;
use crate::services::ics::{serialize_to_ics, APPLE_ICS_FILENAME, DEFAULT_ICS_FILENAME};
use crate::services::time_slots::{compute_end_instant, parse_time_slot_label};

// Response structure for a confirmed booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub meeting_type: MeetingType,
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub email: String,
    pub notes: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub calendar_event_id: Option<String>,
    pub google_calendar_url: String,
    pub ics_path: String,
    pub add_to_calendar: AddToCalendar,
}

/// Everything the booking flow needs, borrowed from the application state
pub struct BookingContext<'a> {
    pub store: &'a dyn BookingStore,
    pub calendar: &'a CalendarService,
    pub meeting_types: &'a [MeetingType],
    pub today: NaiveDate,
}

pub fn meeting_title(meeting_type: &MeetingType) -> String {
    format!("Meeting: {}", meeting_type.name)
}

// Description used for calendar exports
fn export_description(notes: Option<&str>, name: &str) -> String {
    match notes {
        Some(notes) => notes.to_string(),
        None => format!("Meeting with {}", name),
    }
}

// Description used for events pushed to a connected provider
fn provider_description(notes: Option<&str>, name: &str, email: &str) -> String {
    match notes {
        Some(notes) => notes.to_string(),
        None => format!("Meeting with {} ({})", name, email),
    }
}

pub fn ics_path(booking_id: &str, provider: Option<CalendarProvider>) -> String {
    match provider {
        Some(CalendarProvider::Apple) => {
            format!("/bookings/{}/calendar.ics?provider=apple", booking_id)
        }
        _ => format!("/bookings/{}/calendar.ics", booking_id),
    }
}

pub fn ics_filename(provider: Option<CalendarProvider>) -> &'static str {
    match provider {
        Some(CalendarProvider::Apple) => APPLE_ICS_FILENAME,
        _ => DEFAULT_ICS_FILENAME,
    }
}

/// Build the exportable meeting for a stored booking
pub fn meeting_record_for(
    booking: &Booking,
    meeting_type: &MeetingType,
) -> ServiceResult<MeetingRecord<Local>> {
    let start = parse_time_slot_label(booking.date, &booking.time)?;

    Ok(MeetingRecord {
        title: meeting_title(meeting_type),
        description: export_description(booking.notes.as_deref(), &booking.name),
        start,
        duration_minutes: meeting_type.duration,
        location: String::new(),
    })
}

fn resolve_meeting_type<'a>(types: &'a [MeetingType], id: &str) -> ServiceResult<&'a MeetingType> {
    find_meeting_type(types, id)
        .ok_or_else(|| ServiceError::Validation(format!("Unknown meeting type: {}", id)))
}

/// Take a visitor's submission through to a stored, exportable booking.
///
/// Validation happens here, before anything reaches the time engine or the
/// store. When the form carries a calendar connection an event is also
/// pushed to that provider.
pub async fn submit_booking(
    ctx: &BookingContext<'_>,
    form: BookingForm,
) -> ServiceResult<BookingConfirmation> {
    let selection = form.selection()?;
    let meeting_type = resolve_meeting_type(ctx.meeting_types, &selection.meeting_type_id)?;

    validate_contact(&form.name, &form.email, VISITOR_MIN_NAME_LEN)?;

    if selection.date < ctx.today {
        return Err(ServiceError::Validation(format!(
            "Date {} is in the past",
            selection.date
        )));
    }

    let name = form.name.trim().to_string();
    let email = form.email.trim().to_string();
    let notes = form.notes();

    // Fail on a bad label before anything is stored
    let start = parse_time_slot_label(selection.date, &selection.time)?;
    let end = compute_end_instant(&start, i64::from(meeting_type.duration));

    debug!(
        "Booking {} for {} from {} to {}",
        meeting_type.name, email, start, end
    );

    let booking_id = ctx.store.create(NewBooking {
        date: selection.date,
        time: selection.time.clone(),
        name: name.clone(),
        email: email.clone(),
        meeting_type: meeting_type.id.clone(),
        notes: notes.clone(),
    })?;

    let calendar_event_id = match &form.calendar {
        Some(connection) => {
            push_to_calendar(
                ctx.calendar,
                connection,
                meeting_type,
                &name,
                &email,
                notes.as_deref(),
                &start,
                &end,
            )
            .await
        }
        None => None,
    };

    let meeting = MeetingRecord {
        title: meeting_title(meeting_type),
        description: export_description(notes.as_deref(), &name),
        start,
        duration_minutes: meeting_type.duration,
        location: String::new(),
    };
    let google_calendar_url = build_provider_deep_link(&meeting, &end);

    let provider = form.calendar.as_ref().map(|c| c.provider);
    let add_to_calendar = match provider {
        Some(CalendarProvider::Google) => AddToCalendar::OpenUrl {
            url: google_calendar_url.clone(),
        },
        _ => AddToCalendar::DownloadIcs {
            path: ics_path(&booking_id, provider),
            filename: ics_filename(provider).to_string(),
        },
    };

    info!(
        "Booking {} confirmed: {} on {} at {}",
        booking_id, meeting_type.name, selection.date, selection.time
    );

    Ok(BookingConfirmation {
        booking_id: booking_id.clone(),
        meeting_type: meeting_type.clone(),
        date: selection.date,
        time: selection.time,
        name,
        email,
        notes,
        start: meeting.start.fixed_offset(),
        end: end.fixed_offset(),
        calendar_event_id,
        google_calendar_url,
        ics_path: ics_path(&booking_id, None),
        add_to_calendar,
    })
}

// The booking is already stored, so a provider failure is logged, not returned
#[allow(clippy::too_many_arguments)]
async fn push_to_calendar(
    calendar: &CalendarService,
    connection: &CalendarConnection,
    meeting_type: &MeetingType,
    name: &str,
    email: &str,
    notes: Option<&str>,
    start: &DateTime<Local>,
    end: &DateTime<Local>,
) -> Option<String> {
    let event = build_calendar_event(
        meeting_title(meeting_type),
        provider_description(notes, name, email),
        start,
        end,
        email,
    );

    match calendar.create_event(connection, &event).await {
        Ok(event_id) => Some(event_id),
        Err(e) => {
            error!("Failed to create {} calendar event: {}", connection.provider, e);
            None
        }
    }
}

/// Serialized .ics content and download filename for a stored booking
pub fn booking_ics(
    store: &dyn BookingStore,
    meeting_types: &[MeetingType],
    booking_id: &str,
    provider: Option<CalendarProvider>,
) -> ServiceResult<(String, &'static str)> {
    let booking = store
        .get(booking_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("booking {}", booking_id)))?;

    let meeting_type = find_meeting_type(meeting_types, &booking.meeting_type).ok_or_else(|| {
        warn!(
            "Booking {} references unknown meeting type {}",
            booking.id, booking.meeting_type
        );
        ServiceError::Validation(format!("Unknown meeting type: {}", booking.meeting_type))
    })?;

    let meeting = meeting_record_for(&booking, meeting_type)?;
    Ok((serialize_to_ics(&meeting), ics_filename(provider)))
}
