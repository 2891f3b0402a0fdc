use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Record stored in the bookings CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub date: NaiveDate,
    pub time: String, // display label, e.g. "2:30 PM"
    pub name: String,
    pub email: String,
    pub meeting_type: String, // MeetingType id
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Booking fields supplied by the caller on create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub email: String,
    pub meeting_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUpdate {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub meeting_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.name.is_none()
            && self.email.is_none()
            && self.meeting_type.is_none()
            && self.notes.is_none()
    }

    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(date) = self.date {
            booking.date = date;
        }
        if let Some(time) = &self.time {
            booking.time = time.clone();
        }
        if let Some(name) = &self.name {
            booking.name = name.clone();
        }
        if let Some(email) = &self.email {
            booking.email = email.clone();
        }
        if let Some(meeting_type) = &self.meeting_type {
            booking.meeting_type = meeting_type.clone();
        }
        if let Some(notes) = &self.notes {
            // An empty string clears the notes
            booking.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
    }
}

// Response structure for the admin booking list
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}
