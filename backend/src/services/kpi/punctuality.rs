use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::models::kpi::{PunctualityMetrics, PunctualityTrend};
use crate::models::time_entry::TimeEntry;

use super::grouping::{ratio, week_start, GroupExt};
use super::KpiPolicy;

fn threshold_for(arrival: NaiveDateTime, policy: &KpiPolicy) -> NaiveDateTime {
    arrival.date().and_time(policy.punctuality_threshold)
}

/// Arrival at or before the threshold on its own calendar day.
pub fn is_punctual(arrival: NaiveDateTime, policy: &KpiPolicy) -> bool {
    arrival <= threshold_for(arrival, policy)
}

/// Whole minutes past the threshold, zero when punctual.
pub fn late_minutes(arrival: NaiveDateTime, policy: &KpiPolicy) -> i64 {
    (arrival - threshold_for(arrival, policy)).num_minutes().max(0)
}

pub fn punctuality_rate(entries: &[TimeEntry], policy: &KpiPolicy) -> f64 {
    let punctual = entries
        .iter()
        .filter(|e| is_punctual(e.arrival, policy))
        .count();
    ratio(punctual as f64, entries.len() as f64)
}

#[derive(Default)]
struct Tally {
    on_time: usize,
    late: usize,
    late_minutes: i64,
}

impl Tally {
    fn record(&mut self, arrival: NaiveDateTime, policy: &KpiPolicy) {
        if is_punctual(arrival, policy) {
            self.on_time += 1;
        } else {
            self.late += 1;
            self.late_minutes += late_minutes(arrival, policy);
        }
    }

    fn total(&self) -> usize {
        self.on_time + self.late
    }

    fn avg_late_minutes(&self) -> f64 {
        ratio(self.late_minutes as f64, self.late as f64)
    }
}

pub fn punctuality_metrics(entries: &[TimeEntry], policy: &KpiPolicy) -> PunctualityMetrics {
    let mut overall = Tally::default();
    let mut punctual_users = BTreeSet::new();
    let mut late_users = BTreeSet::new();
    for entry in entries {
        overall.record(entry.arrival, policy);
        if is_punctual(entry.arrival, policy) {
            punctual_users.insert(entry.user_id);
        } else {
            late_users.insert(entry.user_id);
        }
    }

    let trend_by_week = entries
        .iter()
        .group_reduce(
            |e| week_start(e.arrival.date()),
            |tally: &mut Tally, e| tally.record(e.arrival, policy),
        )
        .into_iter()
        .map(|(week_start, tally)| PunctualityTrend {
            week_start,
            on_time_rate: ratio(tally.on_time as f64, tally.total() as f64),
            avg_late_minutes: tally.avg_late_minutes(),
        })
        .collect();

    PunctualityMetrics {
        on_time_rate: ratio(overall.on_time as f64, overall.total() as f64),
        late_rate: ratio(overall.late as f64, overall.total() as f64),
        avg_late_minutes: overall.avg_late_minutes(),
        total_late_incidents: overall.late,
        punctual_users: punctual_users.len(),
        late_users: late_users.len(),
        trend_by_week,
    }
}
