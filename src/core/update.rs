//! Schedule update protocols.
//!
//! An update to one schedule is either nothing, a wholesale replacement, or a
//! single appended transition. Callers describe what they asked for with a
//! [`ScheduleOverride`]; resolving it yields the one [`ScheduleUpdate`] to
//! apply, or a conflict if both protocols were requested at once.

use super::error::ScheduleError;
use super::schedule::{Schedule, Transition};
use super::value::ScheduleValue;

/// The single mutation to apply to a schedule.
#[derive(Clone, Debug, PartialEq)]
pub enum ScheduleUpdate<V: ScheduleValue> {
    /// Leave the schedule as it is
    Keep,

    /// Replace the entire history (administrator override)
    ReplaceAll(Vec<Transition<V>>),

    /// Add one transition after every existing one
    AppendOne(Transition<V>),
}

impl<V: ScheduleValue> ScheduleUpdate<V> {
    /// Apply the update to `base`, or to a fresh schedule when there is no
    /// previous revision.
    ///
    /// Without a base, `Keep` and `ReplaceAll` start from
    /// `Schedule::constant(default)`, while `AppendOne` seeds a new schedule
    /// from the single transition, which must then sit at the start of time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tld_timetable::core::{Schedule, ScheduleUpdate, Transition};
    /// use tld_timetable::tld::TldState;
    ///
    /// let seeded = ScheduleUpdate::AppendOne(Transition::at_start_of_time(
    ///     TldState::GeneralAvailability,
    /// ))
    /// .apply(None, TldState::Predelegation)
    /// .unwrap();
    ///
    /// assert_eq!(seeded, Schedule::constant(TldState::GeneralAvailability));
    /// ```
    pub fn apply(self, base: Option<&Schedule<V>>, default: V) -> Result<Schedule<V>, ScheduleError> {
        match (self, base) {
            (Self::Keep, Some(schedule)) => Ok(schedule.clone()),
            (Self::Keep, None) => Ok(Schedule::constant(default)),
            (Self::ReplaceAll(entries), Some(schedule)) => schedule.replace_all(entries),
            (Self::ReplaceAll(entries), None) => Schedule::constant(default).replace_all(entries),
            (Self::AppendOne(transition), Some(schedule)) => schedule.append_one(transition),
            (Self::AppendOne(transition), None) => Schedule::from_transitions([transition]),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// What a caller asked to change about one schedule.
///
/// Both fields may be filled in by an outer layer (e.g. two command-line
/// flags); [`resolve`](Self::resolve) decides whether that is legal.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleOverride<V: ScheduleValue> {
    pub replace_all: Vec<Transition<V>>,
    pub append_one: Option<Transition<V>>,
}

impl<V: ScheduleValue> Default for ScheduleOverride<V> {
    fn default() -> Self {
        Self {
            replace_all: Vec::new(),
            append_one: None,
        }
    }
}

impl<V: ScheduleValue> ScheduleOverride<V> {
    /// Request a full replacement.
    pub fn replace(entries: Vec<Transition<V>>) -> Self {
        Self {
            replace_all: entries,
            append_one: None,
        }
    }

    /// Request a single appended transition.
    pub fn append(transition: Transition<V>) -> Self {
        Self {
            replace_all: Vec::new(),
            append_one: Some(transition),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replace_all.is_empty() && self.append_one.is_none()
    }

    /// Pick the update protocol.
    ///
    /// Fails with [`ScheduleError::ConflictingScheduleUpdate`] when both a
    /// replacement and an append were requested; neither is evaluated.
    pub fn resolve(self) -> Result<ScheduleUpdate<V>, ScheduleError> {
        match (self.replace_all.is_empty(), self.append_one) {
            (false, Some(_)) => Err(ScheduleError::ConflictingScheduleUpdate),
            (false, None) => Ok(ScheduleUpdate::ReplaceAll(self.replace_all)),
            (true, Some(transition)) => Ok(ScheduleUpdate::AppendOne(transition)),
            (true, None) => Ok(ScheduleUpdate::Keep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::start_of_time;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestValue {
        Start,
        Middle,
        End,
    }

    impl fmt::Display for TestValue {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl ScheduleValue for TestValue {}

    fn t(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_override_resolves_to_keep() {
        let update = ScheduleOverride::<TestValue>::default().resolve().unwrap();
        assert!(update.is_keep());
    }

    #[test]
    fn both_protocols_conflict() {
        let request = ScheduleOverride {
            replace_all: vec![Transition::at_start_of_time(TestValue::Start)],
            append_one: Some(Transition::new(t(2024), TestValue::End)),
        };

        assert_eq!(
            request.resolve(),
            Err(ScheduleError::ConflictingScheduleUpdate)
        );
    }

    #[test]
    fn conflict_is_reported_even_when_append_would_fail() {
        // The append below is out of order; the conflict must win.
        let request = ScheduleOverride {
            replace_all: vec![Transition::at_start_of_time(TestValue::Start)],
            append_one: Some(Transition::at_start_of_time(TestValue::End)),
        };

        assert_eq!(
            request.resolve(),
            Err(ScheduleError::ConflictingScheduleUpdate)
        );
    }

    #[test]
    fn keep_without_base_uses_default() {
        let schedule = ScheduleUpdate::Keep.apply(None, TestValue::Start).unwrap();
        assert_eq!(schedule, Schedule::constant(TestValue::Start));
    }

    #[test]
    fn keep_with_base_returns_base() {
        let base = Schedule::constant(TestValue::Middle);
        let schedule = ScheduleUpdate::Keep
            .apply(Some(&base), TestValue::Start)
            .unwrap();

        assert_eq!(schedule, base);
    }

    #[test]
    fn append_extends_base() {
        let base = Schedule::constant(TestValue::Start);
        let schedule = ScheduleOverride::append(Transition::new(t(2024), TestValue::End))
            .resolve()
            .unwrap()
            .apply(Some(&base), TestValue::Start)
            .unwrap();

        assert_eq!(schedule.lookup(t(2023)), &TestValue::Start);
        assert_eq!(schedule.lookup(t(2025)), &TestValue::End);
    }

    #[test]
    fn append_without_base_must_start_at_start_of_time() {
        let result = ScheduleUpdate::AppendOne(Transition::new(t(2024), TestValue::End))
            .apply(None, TestValue::Start);

        assert_eq!(result, Err(ScheduleError::MissingStartOfTime));
    }

    #[test]
    fn replace_without_base_ignores_default() {
        let schedule = ScheduleUpdate::ReplaceAll(vec![
            Transition::new(start_of_time(), TestValue::Middle),
            Transition::new(t(2024), TestValue::End),
        ])
        .apply(None, TestValue::Start)
        .unwrap();

        assert_eq!(schedule.lookup(t(2000)), &TestValue::Middle);
    }
}
