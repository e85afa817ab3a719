//! Core utilities shared by the Telestash ingest and query services

pub mod auth;
pub mod time;
mod constants;

pub use auth::{AuthError, SharedSecret};
pub use constants::*;
pub use time::{parse_utc_override, TimeParseError};
