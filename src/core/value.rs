//! The `ScheduleValue` trait for values carried by a schedule.
//!
//! Anything a schedule stores must be cheap to clone, comparable and
//! serializable, so that schedules can be copied into new revisions and
//! persisted alongside them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};

/// Trait for values that vary over time inside a [`Schedule`](super::Schedule).
///
/// All methods are pure. Values are immutable once recorded in a transition.
///
/// # Required Traits
///
/// - `Clone`: schedules are copied when a new revision is staged
/// - `PartialEq`: lookups are compared in tests and in idempotence checks
/// - `Debug` + `Display`: values appear in error messages and logs
/// - `Serialize` + `DeserializeOwned`: revisions are persisted as snapshots
///
/// # Example
///
/// ```rust
/// use tld_timetable::core::ScheduleValue;
/// use serde::{Deserialize, Serialize};
/// use std::fmt;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Phase {
///     Closed,
///     Open,
/// }
///
/// impl fmt::Display for Phase {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(match self {
///             Self::Closed => "CLOSED",
///             Self::Open => "OPEN",
///         })
///     }
/// }
///
/// impl ScheduleValue for Phase {}
///
/// assert_eq!(Phase::Open.describe(), "OPEN");
/// ```
pub trait ScheduleValue:
    Clone + PartialEq + Debug + Display + Serialize + DeserializeOwned + Send + Sync
{
    /// Human-readable rendering used in errors and log fields.
    ///
    /// Default implementation uses `Display`.
    fn describe(&self) -> String {
        self.to_string()
    }

    /// Whether `other` may share a schedule with `self`.
    ///
    /// Checked against the first transition whenever a schedule is built,
    /// appended to or deserialized. Defaults to `true`.
    fn compatible_with(&self, _other: &Self) -> bool {
        true
    }
}
