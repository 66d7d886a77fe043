//! HTTP route handlers

pub mod auth;
pub mod batch;
pub mod decks;
pub mod review;
pub mod tags;
pub mod users;
pub mod words;

use uuid::Uuid;

use crate::error::{ApiError, Result};

/// Parse a path or body id, rejecting malformed values with 400
pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|_| ApiError::Parse(format!("invalid {} id: {}", what, value)))
}
