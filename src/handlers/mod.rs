pub mod admin;
pub mod api;
pub mod download;
pub mod health;
