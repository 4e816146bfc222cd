use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use std::sync::Arc;

/// A completed observation of one application's continuous focus period.
///
/// Timestamps are persisted as epoch seconds and `duration_seconds` is computed
/// once when the interval is closed. The reporting path reads the stored value
/// back instead of recomputing it, so formatting precision can never change a
/// total after the fact.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct UsageInterval {
    pub app_name: Arc<str>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl UsageInterval {
    /// Closes the focus period that started at `start_time` for `app_name`.
    ///
    /// `duration_seconds` is the floored whole-second difference. A switch
    /// detected within the same second yields a legal zero-duration interval.
    pub fn closed_at(app_name: Arc<str>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            app_name,
            start_time,
            end_time,
            duration_seconds: (end_time - start_time).num_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::UsageInterval;

    #[test]
    fn duration_is_floored_seconds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = start + Duration::milliseconds(2700);
        let interval = UsageInterval::closed_at("editor".into(), start, end);
        assert_eq!(interval.duration_seconds, 2);
    }

    #[test]
    fn zero_duration_interval_is_legal() {
        let moment = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let interval = UsageInterval::closed_at("editor".into(), moment, moment);
        assert_eq!(interval.duration_seconds, 0);
        assert!(interval.end_time >= interval.start_time);
    }

    #[test]
    fn timestamps_round_trip_as_epoch_seconds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let interval =
            UsageInterval::closed_at("browser".into(), start, start + Duration::seconds(90));
        let encoded = serde_json::to_string(&interval).unwrap();
        let decoded: UsageInterval = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, interval);
    }
}
