use chrono::NaiveDateTime;

use crate::models::kpi::{AdminKpiSummary, UserKpiSummary};
use crate::models::time_entry::TimeEntry;
use crate::types::UserId;

use super::compliance::compliance_rate;
use super::daily::{aggregate_daily, current_streak, daily_points};
use super::grouping::{distinct_users, measure, open_users, ratio};
use super::overtime::overtime_minutes;
use super::punctuality::punctuality_rate;
use super::window::TimeWindow;
use super::KpiPolicy;

pub fn user_summary(
    user_id: Option<UserId>,
    window: &TimeWindow,
    entries: &[TimeEntry],
    now: NaiveDateTime,
    policy: &KpiPolicy,
) -> UserKpiSummary {
    let daily = aggregate_daily(entries, now.date(), now);
    let days_present = daily.days_present.len();

    UserKpiSummary {
        from: window.start,
        to: window.end,
        user_id,
        worked_minutes: daily.total_minutes,
        overtime_minutes: overtime_minutes(daily.total_minutes, days_present, policy),
        days_present,
        current_streak_days: current_streak(&daily.days_present),
        punctuality_rate: punctuality_rate(entries, policy),
        present_now: daily.present_now,
        daily_worked: daily_points(&daily.per_day),
    }
}

pub fn admin_summary(entries: &[TimeEntry], total_teams: usize, now: NaiveDateTime) -> AdminKpiSummary {
    let total_users = distinct_users(entries).len();
    let total_minutes: i64 = measure(entries, now).iter().map(|m| m.minutes).sum();

    AdminKpiSummary {
        total_users,
        active_users: open_users(entries).len(),
        total_teams,
        total_worked_hours: total_minutes / 60,
        avg_hours_per_user: ratio(total_minutes as f64 / 60.0, total_users as f64),
        compliance_rate: compliance_rate(entries),
    }
}
