use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::models::kpi::{ProductivityMetrics, ProductivityTrend, UserProductivityDetail};
use crate::models::time_entry::TimeEntry;
use crate::types::UserId;

use super::grouping::{display_names, distinct_users, measure, ratio, GroupExt};
use super::{KpiPolicy, TOP_LIST_LIMIT};

#[derive(Default)]
struct DayLoad {
    minutes: i64,
    users: BTreeSet<UserId>,
}

/// Efficiency relative to the daily quota.
///
/// The day base is the number of distinct days on which anyone worked, so a
/// user's efficiency is measured against the whole team's calendar.
pub fn productivity_metrics(
    entries: &[TimeEntry],
    now: NaiveDateTime,
    policy: &KpiPolicy,
) -> ProductivityMetrics {
    let quota = policy.expected_daily_minutes as f64;
    let measured = measure(entries, now);
    let names = display_names(entries);
    let users_in_window = distinct_users(entries).len();

    let per_user = measured
        .iter()
        .filter(|m| m.minutes > 0)
        .group_reduce(|m| m.user_id(), |total: &mut i64, m| *total += m.minutes);
    let per_day = measured.iter().group_reduce(
        |m| m.day(),
        |load: &mut DayLoad, m| {
            load.users.insert(m.user_id());
            if m.minutes > 0 {
                load.minutes += m.minutes;
            }
        },
    );

    let working_days = per_day.values().filter(|d| d.minutes > 0).count();
    let total_minutes: i64 = per_user.values().sum();
    let user_base = quota * working_days as f64;

    let mut top_performers: Vec<UserProductivityDetail> = per_user
        .iter()
        .map(|(user_id, &minutes)| UserProductivityDetail {
            user_id: *user_id,
            user_name: names.get(user_id).cloned().unwrap_or_default(),
            efficiency_rate: ratio(minutes as f64, user_base),
            total_hours: minutes / 60,
        })
        .collect();
    top_performers.sort_by(|a, b| {
        b.efficiency_rate
            .total_cmp(&a.efficiency_rate)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    top_performers.truncate(TOP_LIST_LIMIT);

    let productivity_trend = per_day
        .into_iter()
        .filter(|(_, load)| load.minutes > 0)
        .map(|(date, load)| ProductivityTrend {
            date,
            avg_efficiency: ratio(load.minutes as f64, load.users.len() as f64 * quota),
            total_hours: load.minutes / 60,
        })
        .collect();

    ProductivityMetrics {
        avg_efficiency_rate: ratio(total_minutes as f64, users_in_window as f64 * user_base),
        total_productive_hours: total_minutes / 60,
        avg_hours_per_user: ratio(total_minutes as f64 / 60.0, users_in_window as f64),
        top_performers,
        productivity_trend,
    }
}
