use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

// A bookable kind of meeting. Defined by static configuration only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingType {
    pub id: String,
    pub name: String,
    /// Length of the meeting in minutes, always > 0
    pub duration: u32,
    pub description: String,
}

impl MeetingType {
    fn new(id: &str, name: &str, duration: u32, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            duration,
            description: description.to_string(),
        }
    }
}

/// The meeting types offered to visitors
pub fn default_meeting_types() -> Vec<MeetingType> {
    vec![
        MeetingType::new(
            "1",
            "Quick Chat",
            15,
            "A short 15-minute meeting to discuss quick topics or answer questions.",
        ),
        MeetingType::new(
            "2",
            "Standard Meeting",
            30,
            "A standard 30-minute meeting for regular discussions or check-ins.",
        ),
        MeetingType::new(
            "3",
            "In-depth Discussion",
            60,
            "A comprehensive 60-minute meeting for detailed discussions or planning.",
        ),
        MeetingType::new(
            "4",
            "Project Review",
            45,
            "A 45-minute meeting to review project progress and next steps.",
        ),
    ]
}

pub fn find_meeting_type<'a>(types: &'a [MeetingType], id: &str) -> Option<&'a MeetingType> {
    types.iter().find(|meeting_type| meeting_type.id == id)
}

/// A meeting ready for calendar export.
///
/// Built at confirmation time from the visitor's input and the selected
/// meeting type; never persisted.
#[derive(Debug, Clone)]
pub struct MeetingRecord<Tz: TimeZone> {
    pub title: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub duration_minutes: u32,
    pub location: String,
}
