//! Validation-based rules for staged TLD revisions.
//!
//! Rules use Stillwater's `Validation` type to accumulate ALL violations
//! instead of failing fast, so an administrator sees every problem with a
//! change in a single pass.
//!
//! # Example
//!
//! ```rust
//! use stillwater::validation::Validation;
//! use tld_timetable::enforcement::rules;
//!
//! let shared = "common_";
//! let names = vec!["foo_extra".to_string(), "bar_extra".to_string()];
//!
//! let checks = vec![
//!     rules::canonical_name("foo"),
//!     rules::reserved_list_naming("foo", &names, shared),
//! ];
//! let result = Validation::all_vec(checks);
//!
//! assert!(result.is_failure());
//! ```

pub mod context;
pub mod rules;
pub mod violations;

pub use context::StagingContext;
pub use rules::{Check, Checked};
pub use violations::{NamingPolicy, ReferenceKind, Violation, Warning};
