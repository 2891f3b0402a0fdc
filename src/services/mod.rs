pub mod availability;
pub mod booking;
pub mod calendar;
pub mod calendar_links;
pub mod database;
pub mod ics;
pub mod time_slots;




#[cfg(test)]
#[path = "availability_test.rs"]
mod availability_test;

#[cfg(test)]
#[path = "booking_test.rs"]
mod booking_test;
