//! Errors raised by schedule construction and mutation.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when building or mutating a schedule.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Duplicate transition timestamp: {at}")]
    DuplicateTimestamp { at: DateTime<Utc> },

    #[error("Cannot add {value} at {at} when there is a later transition already scheduled (latest: {latest})")]
    OutOfOrderTransition {
        value: String,
        at: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    #[error("Don't pass both a full transition list and a single transition to add")]
    ConflictingScheduleUpdate,

    #[error("Must provide transition entry for the start of time (Unix Epoch)")]
    MissingStartOfTime,

    #[error("Cannot schedule {found} after {first}: all transitions must agree")]
    IncompatibleValues { first: String, found: String },
}
