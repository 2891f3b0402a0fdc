use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::ServiceError;
use crate::models::booking::{BookingUpdate, NewBooking};
use crate::models::calendar::CalendarConnection;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("valid email regex")
});

/// Minimum name length for visitor bookings
pub const VISITOR_MIN_NAME_LEN: usize = 2;
/// Minimum name length for bookings entered by an administrator
pub const ADMIN_MIN_NAME_LEN: usize = 1;

// Visitor booking submission
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookingForm {
    #[serde(default)]
    pub meeting_type_id: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub calendar: Option<CalendarConnection>,
}

/// The three choices a visitor must make before contact details matter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub meeting_type_id: String,
    pub date: NaiveDate,
    pub time: String,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BookingForm {
    /// Resolve meeting type, date and time or report which ones are missing
    pub fn selection(&self) -> Result<Selection, ServiceError> {
        let meeting_type_id = non_blank(&self.meeting_type_id);
        let time = non_blank(&self.time);

        let mut missing = Vec::new();
        if meeting_type_id.is_none() {
            missing.push("meeting type");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if time.is_none() {
            missing.push("time");
        }

        match (meeting_type_id, self.date, time) {
            (Some(meeting_type_id), Some(date), Some(time)) => Ok(Selection {
                meeting_type_id,
                date,
                time,
            }),
            _ => Err(ServiceError::MissingSelection(format!(
                "Please select a {}",
                missing.join(", ")
            ))),
        }
    }

    /// Notes with surrounding whitespace removed; blank notes count as absent
    pub fn notes(&self) -> Option<String> {
        non_blank(&self.notes)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    !local.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

/// Check contact fields, collecting every problem into one message
pub fn validate_contact(name: &str, email: &str, min_name_len: usize) -> Result<(), ServiceError> {
    let mut problems = Vec::new();

    if name.trim().chars().count() < min_name_len {
        if min_name_len <= 1 {
            problems.push("Name is required".to_string());
        } else {
            problems.push(format!("Name must be at least {} characters", min_name_len));
        }
    }

    if !is_valid_email(email.trim()) {
        problems.push("Please enter a valid email address".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(problems.join("; ")))
    }
}

// Admin-entered booking checks
pub fn validate_new_booking(booking: &NewBooking) -> Result<(), ServiceError> {
    validate_contact(&booking.name, &booking.email, ADMIN_MIN_NAME_LEN)?;

    if booking.meeting_type.trim().is_empty() {
        return Err(ServiceError::Validation("Meeting type is required".to_string()));
    }
    if booking.time.trim().is_empty() {
        return Err(ServiceError::Validation("Time is required".to_string()));
    }
    Ok(())
}

pub fn validate_booking_update(update: &BookingUpdate) -> Result<(), ServiceError> {
    if update.is_empty() {
        return Err(ServiceError::Validation("Update contains no fields".to_string()));
    }
    if let Some(name) = &update.name {
        if name.trim().chars().count() < ADMIN_MIN_NAME_LEN {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }
    }
    if let Some(email) = &update.email {
        if !is_valid_email(email.trim()) {
            return Err(ServiceError::Validation("Valid email is required".to_string()));
        }
    }
    if matches!(&update.meeting_type, Some(t) if t.trim().is_empty()) {
        return Err(ServiceError::Validation("Meeting type is required".to_string()));
    }
    if matches!(&update.time, Some(t) if t.trim().is_empty()) {
        return Err(ServiceError::Validation("Time is required".to_string()));
    }
    Ok(())
}
