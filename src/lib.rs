//! TLD Timetable: time-varying registry policy with staged validation
//!
//! Built on Stillwater's "pure core, imperative shell" philosophy. The core
//! is an immutable schedule of timed transitions with floor lookup; around it,
//! pure staging rules turn an old TLD revision plus a sparse patch into a new
//! revision, accumulating every violation with `Validation`. Storage, catalogs
//! and cache invalidation sit behind narrow traits in the shell.
//!
//! # Core Concepts
//!
//! - **Schedule**: ordered `(effective time, value)` history with floor lookup
//! - **Update protocols**: replace the whole history, or append one transition
//! - **Staging**: old revision × patch → new revision or all violations
//! - **Commands**: batch create/update against a store, then cache invalidation
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use tld_timetable::core::{start_of_time, Schedule, Transition};
//! use tld_timetable::tld::TldState;
//!
//! let now = Utc::now();
//! let states = Schedule::constant(TldState::Predelegation)
//!     .append_one(Transition::new(now, TldState::GeneralAvailability))
//!     .unwrap();
//!
//! assert_eq!(states.lookup(start_of_time()), &TldState::Predelegation);
//! assert_eq!(states.lookup(now + Duration::days(365)), &TldState::GeneralAvailability);
//!
//! // Appending at or before the latest transition would rewrite history.
//! assert!(states
//!     .append_one(Transition::new(now, TldState::Pdt))
//!     .is_err());
//! ```

mod macros;

pub mod cache;
pub mod catalog;
pub mod command;
pub mod config;
pub mod core;
pub mod enforcement;
pub mod identity;
pub mod money;
pub mod patch;
pub mod snapshot;
pub mod staging;
pub mod store;
pub mod tld;

// Re-export commonly used types
pub use crate::core::{Schedule, ScheduleError, ScheduleOverride, ScheduleUpdate, Transition};
pub use command::{BatchReport, CommandKind, Outcome, TldCommand};
pub use macros::ParseEnumError;
pub use staging::{stage, Rejection, StagedRevision};
pub use tld::Tld;
