use std::{mem, sync::Arc};

use chrono::{DateTime, Utc};

use crate::storage::entities::UsageInterval;

/// Focus state carried between sampling ticks.
///
/// Holding the open interval in an explicit struct keeps every transition
/// testable without running the timed loop: feed it samples and timestamps and
/// inspect which intervals come out.
pub struct FocusState {
    current_app: Arc<str>,
    current_start: DateTime<Utc>,
}

impl FocusState {
    pub fn new(current_app: Arc<str>, now: DateTime<Utc>) -> Self {
        Self {
            current_app,
            current_start: now,
        }
    }

    /// Feeds one probe sample into the state machine.
    ///
    /// Returns the closed interval for the previously focused application when
    /// the sample differs from it, otherwise `None`. The open interval for the
    /// new sample starts at `now`.
    pub fn observe(&mut self, sample: Arc<str>, now: DateTime<Utc>) -> Option<UsageInterval> {
        if sample == self.current_app {
            return None;
        }

        let previous = mem::replace(&mut self.current_app, sample);
        let started = mem::replace(&mut self.current_start, now);
        Some(UsageInterval::closed_at(previous, started, now))
    }

    pub fn current_app(&self) -> &str {
        &self.current_app
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::FocusState;

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn tick(n: i64) -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE) + Duration::seconds(n)
    }

    #[test]
    fn switches_close_exactly_the_finished_segments() {
        let samples = ["a", "a", "a", "b", "b", "c"];
        let mut state = FocusState::new(samples[0].into(), tick(0));

        let mut closed = vec![];
        for (n, sample) in samples.iter().enumerate().skip(1) {
            closed.extend(state.observe((*sample).into(), tick(n as i64)));
        }

        assert_eq!(closed.len(), 2);
        assert_eq!(&*closed[0].app_name, "a");
        assert_eq!(closed[0].duration_seconds, 3);
        assert_eq!(&*closed[1].app_name, "b");
        assert_eq!(closed[1].duration_seconds, 2);
        // The final segment stays open.
        assert_eq!(state.current_app(), "c");
    }

    #[test]
    fn stable_input_emits_nothing() {
        let mut state = FocusState::new("a".into(), tick(0));
        for n in 1..100 {
            assert!(state.observe("a".into(), tick(n)).is_none());
        }
    }

    #[test]
    fn emitted_durations_are_floored_and_non_negative() {
        let mut state = FocusState::new("a".into(), tick(0));
        let closed = state
            .observe("b".into(), tick(0) + Duration::milliseconds(1700))
            .unwrap();
        assert_eq!(closed.duration_seconds, 1);
        assert_eq!(
            closed.duration_seconds,
            (closed.end_time - closed.start_time).num_seconds()
        );
    }

    #[test]
    fn switch_within_the_same_tick_closes_a_zero_duration_interval() {
        let mut state = FocusState::new("a".into(), tick(0));
        let first = state.observe("b".into(), tick(0)).unwrap();
        assert_eq!(&*first.app_name, "a");
        assert_eq!(first.duration_seconds, 0);

        let second = state.observe("c".into(), tick(0)).unwrap();
        assert_eq!(&*second.app_name, "b");
        assert_eq!(second.duration_seconds, 0);
    }

    #[test]
    fn open_interval_start_carries_over_between_switches() {
        let mut state = FocusState::new("a".into(), tick(0));
        state.observe("b".into(), tick(4));
        let closed = state.observe("a".into(), tick(9)).unwrap();
        assert_eq!(closed.start_time, tick(4));
        assert_eq!(closed.end_time, tick(9));
        assert_eq!(closed.duration_seconds, 5);
    }
}
