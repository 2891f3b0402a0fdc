pub mod booking;
pub mod calendar;
pub mod common;
pub mod form;
pub mod meeting;

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;
