//! Classification of failed single-row lookups.

use serde::{Deserialize, Serialize};

use crate::error::DataAccessError;

/// Code reported when a single-row lookup matched no rows.
pub const NOT_FOUND_CODE: &str = "PGRST116";

/// Error reported by the store for a point lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
    pub code: Option<String>,
    pub message: String,
}

impl QueryError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(Some(NOT_FOUND_CODE), "The result contains 0 rows")
    }

    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(NOT_FOUND_CODE)
    }
}

/// Map a failed point lookup to `Ok(None)` when the row is absent,
/// otherwise to an error prefixed with `context`.
pub fn handle_single_query_error<T>(
    error: &QueryError,
    context: &str,
) -> Result<Option<T>, DataAccessError> {
    if error.is_not_found() {
        return Ok(None);
    }
    Err(DataAccessError::new(context, error.message.clone()))
}
