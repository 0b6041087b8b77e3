//! Timed transition schedules.
//!
//! Provides an immutable, ordered history of `(effective time, value)` pairs
//! with floor lookup, following functional programming principles: every
//! mutation returns a new schedule and leaves the original untouched.

use super::error::ScheduleError;
use super::value::ScheduleValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The distinguished minimum instant every schedule starts at (the Unix epoch).
pub fn start_of_time() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// A single value taking effect at a point in time.
///
/// # Example
///
/// ```rust
/// use tld_timetable::core::{start_of_time, Transition};
/// use tld_timetable::tld::TldState;
///
/// let transition = Transition::new(start_of_time(), TldState::Predelegation);
/// assert_eq!(transition.effective_at, start_of_time());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Transition<V: ScheduleValue> {
    /// When the value takes effect
    pub effective_at: DateTime<Utc>,
    /// The value in effect from `effective_at` until the next transition
    pub value: V,
}

impl<V: ScheduleValue> Transition<V> {
    pub fn new(effective_at: DateTime<Utc>, value: V) -> Self {
        Self {
            effective_at,
            value,
        }
    }

    /// A transition at [`start_of_time`], i.e. the schedule's fallback value.
    pub fn at_start_of_time(value: V) -> Self {
        Self::new(start_of_time(), value)
    }
}

/// Ordered history of timed transitions for one attribute.
///
/// Invariants, enforced by every constructor:
///
/// - timestamps are unique and strictly increasing;
/// - the first transition sits at [`start_of_time`], so the schedule is never
///   empty and every lookup has an answer;
/// - every value is [compatible](ScheduleValue::compatible_with) with the
///   first one (a cost schedule never mixes currencies).
///
/// Schedules are immutable. [`append_one`](Self::append_one) and
/// [`replace_all`](Self::replace_all) return new schedules.
///
/// # Example
///
/// ```rust
/// use tld_timetable::core::{Schedule, Transition};
/// use tld_timetable::tld::TldState;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let schedule = Schedule::constant(TldState::Predelegation);
///
/// let schedule = schedule
///     .append_one(Transition::new(now, TldState::GeneralAvailability))
///     .unwrap();
///
/// assert_eq!(schedule.lookup(now - Duration::days(1)), &TldState::Predelegation);
/// assert_eq!(schedule.lookup(now), &TldState::GeneralAvailability);
///
/// // History cannot be rewritten through the append path.
/// assert!(schedule
///     .append_one(Transition::new(now, TldState::Pdt))
///     .is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    bound = "",
    try_from = "Vec<Transition<V>>",
    into = "Vec<Transition<V>>"
)]
pub struct Schedule<V: ScheduleValue> {
    transitions: Vec<Transition<V>>,
}

impl<V: ScheduleValue> Schedule<V> {
    /// A schedule holding a single value for all of time.
    pub fn constant(value: V) -> Self {
        Self {
            transitions: vec![Transition::at_start_of_time(value)],
        }
    }

    /// Build a schedule from an unordered collection of transitions.
    ///
    /// Fails with [`ScheduleError::DuplicateTimestamp`] if two entries share a
    /// timestamp, with [`ScheduleError::MissingStartOfTime`] if the earliest
    /// entry is not at [`start_of_time`] (including empty input), and with
    /// [`ScheduleError::IncompatibleValues`] if a value cannot follow the first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tld_timetable::core::{start_of_time, Schedule, ScheduleError, Transition};
    /// use tld_timetable::tld::TldState;
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let schedule = Schedule::from_transitions(vec![
    ///     Transition::new(now, TldState::GeneralAvailability),
    ///     Transition::new(start_of_time(), TldState::Predelegation),
    /// ])
    /// .unwrap();
    /// assert_eq!(schedule.transitions()[0].value, TldState::Predelegation);
    ///
    /// let missing = Schedule::from_transitions(vec![Transition::new(now, TldState::Pdt)]);
    /// assert_eq!(missing, Err(ScheduleError::MissingStartOfTime));
    /// ```
    pub fn from_transitions<I>(entries: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = Transition<V>>,
    {
        let mut transitions: Vec<Transition<V>> = entries.into_iter().collect();
        transitions.sort_by_key(|t| t.effective_at);

        if let Some(pair) = transitions
            .windows(2)
            .find(|pair| pair[0].effective_at == pair[1].effective_at)
        {
            return Err(ScheduleError::DuplicateTimestamp {
                at: pair[0].effective_at,
            });
        }

        let first = match transitions.first() {
            Some(first) if first.effective_at == start_of_time() => &first.value,
            _ => return Err(ScheduleError::MissingStartOfTime),
        };
        if let Some(other) = transitions.iter().find(|t| !first.compatible_with(&t.value)) {
            return Err(incompatible(first, &other.value));
        }
        Ok(Self { transitions })
    }

    /// Value in effect at `at`: the value of the latest transition whose
    /// `effective_at` is at or before `at`.
    ///
    /// Instants before every transition resolve to the start-of-time value.
    /// Runs in logarithmic time.
    pub fn lookup(&self, at: DateTime<Utc>) -> &V {
        let index = self
            .transitions
            .partition_point(|t| t.effective_at <= at)
            .saturating_sub(1);
        &self.transitions[index].value
    }

    /// Replace the whole history with `entries`.
    ///
    /// This is the administrator override path: no ordering relationship to
    /// the current history is required. Empty input leaves the schedule
    /// unchanged, since a schedule can never be cleared.
    pub fn replace_all(&self, entries: Vec<Transition<V>>) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Ok(self.clone());
        }
        Self::from_transitions(entries)
    }

    /// Return a new schedule with `transition` added at the end.
    ///
    /// Fails with [`ScheduleError::OutOfOrderTransition`] unless the
    /// transition is strictly after every existing one, and with
    /// [`ScheduleError::IncompatibleValues`] if its value cannot join the
    /// schedule.
    pub fn append_one(&self, transition: Transition<V>) -> Result<Self, ScheduleError> {
        let latest = self.latest_effective_at();
        if transition.effective_at <= latest {
            return Err(ScheduleError::OutOfOrderTransition {
                value: transition.value.describe(),
                at: transition.effective_at,
                latest,
            });
        }
        let first = &self.transitions[0].value;
        if !first.compatible_with(&transition.value) {
            return Err(incompatible(first, &transition.value));
        }

        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Ok(Self { transitions })
    }

    /// Timestamp of the last scheduled transition.
    pub fn latest_effective_at(&self) -> DateTime<Utc> {
        self.transitions
            .last()
            .map_or_else(start_of_time, |t| t.effective_at)
    }

    /// Get all transitions in time order.
    pub fn transitions(&self) -> &[Transition<V>] {
        &self.transitions
    }

    /// Values in time order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.transitions.iter().map(|t| &t.value)
    }

    /// Whether some transition takes effect exactly at `at`.
    pub fn has_transition_at(&self, at: DateTime<Utc>) -> bool {
        self.transitions
            .binary_search_by_key(&at, |t| t.effective_at)
            .is_ok()
    }
}

fn incompatible<V: ScheduleValue>(first: &V, found: &V) -> ScheduleError {
    ScheduleError::IncompatibleValues {
        first: first.describe(),
        found: found.describe(),
    }
}

impl<V: ScheduleValue> TryFrom<Vec<Transition<V>>> for Schedule<V> {
    type Error = ScheduleError;

    fn try_from(entries: Vec<Transition<V>>) -> Result<Self, Self::Error> {
        Self::from_transitions(entries)
    }
}

impl<V: ScheduleValue> From<Schedule<V>> for Vec<Transition<V>> {
    fn from(schedule: Schedule<V>) -> Self {
        schedule.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::fmt;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestValue {
        Initial,
        Processing,
        Complete,
    }

    impl fmt::Display for TestValue {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl ScheduleValue for TestValue {}

    fn t(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    fn sample() -> Schedule<TestValue> {
        Schedule::from_transitions(vec![
            Transition::at_start_of_time(TestValue::Initial),
            Transition::new(t(2020), TestValue::Processing),
            Transition::new(t(2030), TestValue::Complete),
        ])
        .unwrap()
    }

    #[test]
    fn constant_schedule_answers_every_lookup() {
        let schedule = Schedule::constant(TestValue::Initial);

        assert_eq!(schedule.lookup(start_of_time()), &TestValue::Initial);
        assert_eq!(schedule.lookup(t(2999)), &TestValue::Initial);
        assert_eq!(schedule.transitions().len(), 1);
    }

    #[test]
    fn lookup_is_floor_query() {
        let schedule = sample();

        assert_eq!(schedule.lookup(t(2019)), &TestValue::Initial);
        assert_eq!(schedule.lookup(t(2020)), &TestValue::Processing);
        assert_eq!(
            schedule.lookup(t(2030) - Duration::milliseconds(1)),
            &TestValue::Processing
        );
        assert_eq!(schedule.lookup(t(2030)), &TestValue::Complete);
        assert_eq!(schedule.lookup(t(2100)), &TestValue::Complete);
    }

    #[test]
    fn lookup_before_start_of_time_returns_default() {
        let schedule = sample();
        let before = start_of_time() - Duration::milliseconds(1);

        assert_eq!(schedule.lookup(before), &TestValue::Initial);
    }

    #[test]
    fn from_transitions_sorts_input() {
        let schedule = Schedule::from_transitions(vec![
            Transition::new(t(2030), TestValue::Complete),
            Transition::at_start_of_time(TestValue::Initial),
            Transition::new(t(2020), TestValue::Processing),
        ])
        .unwrap();

        assert_eq!(schedule, sample());
    }

    #[test]
    fn from_transitions_rejects_duplicates() {
        let result = Schedule::from_transitions(vec![
            Transition::at_start_of_time(TestValue::Initial),
            Transition::new(t(2020), TestValue::Processing),
            Transition::new(t(2020), TestValue::Complete),
        ]);

        assert_eq!(result, Err(ScheduleError::DuplicateTimestamp { at: t(2020) }));
    }

    #[test]
    fn from_transitions_requires_start_of_time() {
        let result = Schedule::from_transitions(vec![Transition::new(t(2020), TestValue::Initial)]);
        assert_eq!(result, Err(ScheduleError::MissingStartOfTime));

        let empty: Result<Schedule<TestValue>, _> = Schedule::from_transitions(Vec::new());
        assert_eq!(empty, Err(ScheduleError::MissingStartOfTime));
    }

    #[test]
    fn append_one_is_immutable() {
        let schedule = Schedule::constant(TestValue::Initial);

        let appended = schedule
            .append_one(Transition::new(t(2020), TestValue::Processing))
            .unwrap();

        assert_eq!(schedule.transitions().len(), 1);
        assert_eq!(appended.transitions().len(), 2);
        assert_eq!(appended.latest_effective_at(), t(2020));
    }

    #[test]
    fn append_one_rejects_equal_or_earlier_timestamps() {
        let schedule = sample();

        let equal = schedule.append_one(Transition::new(t(2030), TestValue::Initial));
        assert_eq!(
            equal,
            Err(ScheduleError::OutOfOrderTransition {
                value: "Initial".to_string(),
                at: t(2030),
                latest: t(2030),
            })
        );

        let earlier = schedule.append_one(Transition::new(t(2025), TestValue::Initial));
        assert!(matches!(
            earlier,
            Err(ScheduleError::OutOfOrderTransition { .. })
        ));
    }

    #[test]
    fn append_one_onto_constant_rejects_start_of_time() {
        let schedule = Schedule::constant(TestValue::Initial);
        let result = schedule.append_one(Transition::at_start_of_time(TestValue::Complete));

        assert!(matches!(
            result,
            Err(ScheduleError::OutOfOrderTransition { .. })
        ));
    }

    #[test]
    fn replace_all_with_empty_input_is_noop() {
        let schedule = sample();
        assert_eq!(schedule.replace_all(Vec::new()).unwrap(), schedule);
    }

    #[test]
    fn replace_all_ignores_previous_history() {
        let schedule = sample();

        let replaced = schedule
            .replace_all(vec![
                Transition::at_start_of_time(TestValue::Complete),
                Transition::new(t(2010), TestValue::Initial),
            ])
            .unwrap();

        assert_eq!(replaced.lookup(t(2005)), &TestValue::Complete);
        assert_eq!(replaced.lookup(t(2040)), &TestValue::Initial);
        assert_eq!(schedule, sample());
    }

    #[test]
    fn replace_all_is_idempotent_on_current_entries() {
        let schedule = sample();
        let replaced = schedule
            .replace_all(schedule.transitions().to_vec())
            .unwrap();

        assert_eq!(replaced, schedule);
    }

    #[test]
    fn has_transition_at_matches_exact_keys() {
        let schedule = sample();

        assert!(schedule.has_transition_at(t(2020)));
        assert!(!schedule.has_transition_at(t(2021)));
    }

    #[test]
    fn schedule_serializes_as_transition_list() {
        let schedule = sample();

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(3));

        let deserialized: Schedule<TestValue> = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, schedule);
    }

    #[test]
    fn deserialization_revalidates_invariants() {
        let json = serde_json::json!([
            { "effective_at": "2020-01-01T00:00:00Z", "value": "Initial" }
        ]);

        let result: Result<Schedule<TestValue>, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}
