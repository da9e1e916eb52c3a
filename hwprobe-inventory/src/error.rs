//! Error types for the inventory collection engine.
//!
//! Every variant here is non-fatal: failures are localized to the field or
//! sub-record they affect and surface as [`FieldValue::Error`] entries in the
//! finished record, never as an aborted collection.
//!
//! [`FieldValue::Error`]: crate::field::FieldValue::Error

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while querying a source or interpreting its output.
#[derive(Error, Debug, Clone)]
pub enum CollectError {
    /// The utility is not installed or the pseudo-file does not exist.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The external process exceeded the bounded timeout.
    #[error("source timed out after {0:?}")]
    SourceTimeout(Duration),

    /// The source requires elevated privilege the process does not hold.
    #[error("permission denied: {0}")]
    SourcePermissionDenied(String),

    /// The external process exited with a non-zero status.
    #[error("source failed ({status}): {detail}")]
    SourceFailed { status: String, detail: String },

    /// An expected pattern was not found in the raw output.
    #[error("expected pattern not found: {0}")]
    ParseMismatch(String),

    /// A raw magnitude could not be converted to the canonical unit.
    #[error("cannot interpret {raw:?} as {unit}")]
    UnitConversion { raw: String, unit: &'static str },
}

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, CollectError>;
