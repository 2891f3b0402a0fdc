//! BookSync meeting booking service
//!
//! Visitors pick a meeting type, a date and an available time slot, leave
//! their contact details and get the meeting into their own calendar, either
//! through a Google Calendar link or a downloadable `.ics` file.
//!
//! # Modules
//!
//! - `services::time_slots`: parsing "2:30 PM" style labels into instants
//! - `services::ics` and `services::calendar_links`: calendar exports
//! - `services::booking`: the booking flow from form to confirmation
//! - `services::database`: CSV-backed booking store
//! - `auth`: admin login and signed session tokens
//!
//! # Time zones
//!
//! Time labels are wall-clock times in the server's local zone. Every
//! exported timestamp is converted to UTC before it is written.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

// Re-export the main types for ease of use
pub use auth::AdminAuth;
pub use config::AppConfig;
pub use error::{CalendarError, ServiceError, StoreError};
pub use handlers::api::AppState;
pub use routes::create_router;
