//! Core schedule types and logic.
//!
//! This module contains the pure functional core of the crate:
//! - Schedule values via the `ScheduleValue` trait
//! - Immutable timed transition schedules with floor lookup
//! - The replace-all and append-one update protocols
//!
//! All logic in this module is pure (no side effects, no clock reads).

mod error;
mod schedule;
mod update;
mod value;

pub use error::ScheduleError;
pub use schedule::{start_of_time, Schedule, Transition};
pub use update::{ScheduleOverride, ScheduleUpdate};
pub use value::ScheduleValue;
