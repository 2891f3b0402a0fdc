//! Simulated calendar provider.
//!
//! Stands in for the Google and Apple calendar APIs. Connections are plain
//! values: `connect` returns one and every later call takes it as an
//! argument, so nothing about "which calendar is connected" lives here.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::models::calendar::{
    Attendee, CalendarConnection, CalendarEvent, CalendarProvider, EventTime,
};

#[derive(Debug, Clone, Copy)]
pub struct ProviderDelays {
    pub connect: Duration,
    pub disconnect: Duration,
    pub create_event: Duration,
}

impl ProviderDelays {
    pub fn simulated() -> Self {
        Self {
            connect: Duration::from_millis(1000),
            disconnect: Duration::from_millis(500),
            create_event: Duration::from_millis(1500),
        }
    }

    pub fn none() -> Self {
        Self {
            connect: Duration::ZERO,
            disconnect: Duration::ZERO,
            create_event: Duration::ZERO,
        }
    }
}

pub struct CalendarService {
    delays: ProviderDelays,
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl CalendarService {
    pub fn new(delays: ProviderDelays) -> Self {
        Self { delays }
    }

    /// Connect to a provider.
    ///
    /// Google accepts an optional auth code. Apple needs the calendar URL the
    /// visitor pasted in, which is kept on the returned connection.
    pub async fn connect(
        &self,
        provider: CalendarProvider,
        auth_data: Option<&str>,
    ) -> ServiceResult<CalendarConnection> {
        let auth_data = auth_data.map(str::trim).filter(|s| !s.is_empty());

        let calendar_url = match provider {
            CalendarProvider::Apple => Some(
                auth_data
                    .ok_or_else(|| {
                        ServiceError::Validation("Apple Calendar URL is required".to_string())
                    })?
                    .to_string(),
            ),
            CalendarProvider::Google => None,
        };

        pause(self.delays.connect).await;

        info!(
            "Connected to {} calendar (auth data supplied: {})",
            provider,
            auth_data.is_some()
        );

        Ok(CalendarConnection {
            provider,
            connected_at: Utc::now(),
            calendar_url,
        })
    }

    // Consumes the connection; the caller has nothing left to hold on to
    pub async fn disconnect(&self, connection: CalendarConnection) {
        pause(self.delays.disconnect).await;
        info!("Disconnected from {} calendar", connection.provider);
    }

    /// Create an event on the connected calendar and return its id
    pub async fn create_event(
        &self,
        connection: &CalendarConnection,
        event: &CalendarEvent,
    ) -> ServiceResult<String> {
        pause(self.delays.create_event).await;

        let event_id = format!("event_{}", Utc::now().timestamp_millis());
        info!(
            "Created {} calendar event {}: {}",
            connection.provider, event_id, event.summary
        );
        debug!("Calendar event payload: {:?}", event);

        Ok(event_id)
    }
}

/// Build the provider payload for a booked meeting
pub fn build_calendar_event<Tz: TimeZone>(
    summary: String,
    description: String,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    attendee_email: &str,
) -> CalendarEvent {
    // No zone database here, so the zone is reported as the UTC offset in effect
    let event_time = |instant: &DateTime<Tz>| {
        let fixed = instant.fixed_offset();
        EventTime {
            date_time: instant.with_timezone(&Utc).to_rfc3339(),
            time_zone: fixed.offset().to_string(),
        }
    };

    CalendarEvent {
        summary,
        description,
        location: None,
        start: event_time(start),
        end: event_time(end),
        attendees: vec![Attendee {
            email: attendee_email.to_string(),
        }],
    }
}
