use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

use crate::models::kpi::CoveragePoint;
use crate::models::time_entry::TimeEntry;

use super::window::TimeWindow;

fn truncate_to_hour(at: NaiveDateTime) -> NaiveDateTime {
    NaiveDateTime::new(
        at.date(),
        NaiveTime::MIN + Duration::hours(i64::from(at.hour())),
    )
}

/// Hourly headcount inside `window`.
///
/// Each entry counts once in every hour bucket from its truncated arrival to
/// its truncated effective end, both inclusive. Stale entries and inverted
/// intervals add nothing.
pub fn coverage(entries: &[TimeEntry], window: &TimeWindow, now: NaiveDateTime) -> Vec<CoveragePoint> {
    let lower = window.first_instant();
    let upper = window.last_instant();
    let mut buckets: BTreeMap<NaiveDateTime, usize> = BTreeMap::new();

    for entry in entries {
        let span = entry.span();
        let Some(end) = span.effective_end(now) else {
            continue;
        };
        if end < span.arrival() {
            continue;
        }

        let last = truncate_to_hour(end).min(upper);
        let mut hour = truncate_to_hour(span.arrival()).max(lower);
        while hour <= last {
            *buckets.entry(hour).or_default() += 1;
            hour += Duration::hours(1);
        }
    }

    buckets
        .into_iter()
        .map(|(time, count)| CoveragePoint { time, count })
        .collect()
}
