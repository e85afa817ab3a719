//! HTTP handlers for the query endpoint

pub mod handler;
pub mod types;

pub use handler::{configure_routes, QueryApiDoc};
pub use types::*;
