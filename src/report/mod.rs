//! Turns the persisted interval history into a per-day, per-application
//! usage report.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone};

use crate::storage::{
    entities::UsageInterval,
    interval_store::{IntervalSource, StoreError},
};

/// One report row: total focused seconds for one application on one calendar
/// day. Derived on demand, never stored.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct DailyAppTotal {
    pub date: NaiveDate,
    pub app_name: Arc<str>,
    pub total_seconds: i64,
}

/// Groups intervals by `(application, calendar day of start_time)` and sums
/// the persisted durations.
///
/// The timezone deciding where a day begins is an explicit parameter, so the
/// report stays deterministic across environments. Rows are ordered by date
/// ascending, then total descending; the sort is stable, so applications tied
/// on duration keep their first-seen order.
pub fn aggregate<Tz: TimeZone>(intervals: &[UsageInterval], timezone: &Tz) -> Vec<DailyAppTotal> {
    let mut totals: Vec<DailyAppTotal> = Vec::new();
    for interval in intervals {
        let date = interval.start_time.with_timezone(timezone).date_naive();
        match totals
            .iter_mut()
            .find(|total| total.date == date && total.app_name == interval.app_name)
        {
            Some(total) => total.total_seconds += interval.duration_seconds,
            None => totals.push(DailyAppTotal {
                date,
                app_name: interval.app_name.clone(),
                total_seconds: interval.duration_seconds,
            }),
        }
    }

    totals.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(b.total_seconds.cmp(&a.total_seconds))
    });
    totals
}

/// Builds the full report from everything the source holds.
///
/// An empty source yields an empty report. A malformed stored record aborts
/// the report instead of producing a silently incomplete one.
pub async fn generate<S: IntervalSource, Tz: TimeZone>(
    source: &S,
    timezone: &Tz,
) -> Result<Vec<DailyAppTotal>, StoreError> {
    let intervals = source.scan_all().await?;
    Ok(aggregate(&intervals, timezone))
}
