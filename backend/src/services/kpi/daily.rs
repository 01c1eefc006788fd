use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::kpi::KpiPoint;
use crate::models::time_entry::TimeEntry;

use super::grouping::{measure, GroupExt};

/// Per-day totals for one user's entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyAggregate {
    pub total_minutes: i64,
    pub per_day: BTreeMap<NaiveDate, i64>,
    /// True when an open entry is dated `today`.
    pub present_now: bool,
    pub days_present: BTreeSet<NaiveDate>,
}

pub fn aggregate_daily(entries: &[TimeEntry], today: NaiveDate, now: NaiveDateTime) -> DailyAggregate {
    let measured = measure(entries, now);
    let per_day = measured
        .iter()
        .group_reduce(|m| m.day(), |minutes: &mut i64, m| *minutes += m.minutes);

    DailyAggregate {
        total_minutes: per_day.values().sum(),
        days_present: per_day.keys().copied().collect(),
        present_now: measured.iter().any(|m| m.span.is_open() && m.day() == today),
        per_day,
    }
}

/// Consecutive days ending at the most recent present day.
pub fn current_streak(days: &BTreeSet<NaiveDate>) -> usize {
    let mut recent_first = days.iter().rev();
    let Some(&latest) = recent_first.next() else {
        return 0;
    };

    let mut streak = 1;
    let mut previous = latest;
    for &day in recent_first {
        if previous.pred_opt() != Some(day) {
            break;
        }
        streak += 1;
        previous = day;
    }
    streak
}

pub fn daily_points(per_day: &BTreeMap<NaiveDate, i64>) -> Vec<KpiPoint> {
    per_day
        .iter()
        .map(|(&date, &minutes)| KpiPoint { date, minutes })
        .collect()
}
