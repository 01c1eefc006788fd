use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::models::kpi::{DayDistribution, WorkloadAnalysis};
use crate::models::time_entry::TimeEntry;

use super::grouping::{measure, ratio, user_day_overtime, GroupExt};
use super::KpiPolicy;

/// Working days in the week used to scale the daily average.
const WORK_DAYS_PER_WEEK: f64 = 5.0;

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Default)]
struct WeekdayLoad {
    weekday: Option<Weekday>,
    minutes: i64,
    days: usize,
}

pub fn workload_analysis(
    entries: &[TimeEntry],
    now: NaiveDateTime,
    policy: &KpiPolicy,
) -> WorkloadAnalysis {
    let measured = measure(entries, now);
    let per_day = measured
        .iter()
        .filter(|m| m.minutes > 0)
        .group_reduce(|m| m.day(), |total: &mut i64, m| *total += m.minutes);

    // Strictly greater keeps the earliest day on ties.
    let mut peak: Option<(NaiveDate, i64)> = None;
    for (&day, &minutes) in &per_day {
        if peak.map_or(true, |(_, best)| minutes > best) {
            peak = Some((day, minutes));
        }
    }

    let total_minutes: i64 = per_day.values().sum();
    let avg_daily_minutes = ratio(total_minutes as f64, per_day.len() as f64);

    let distribution_by_day = per_day
        .iter()
        .group_reduce(
            |(day, _)| day.weekday().num_days_from_monday(),
            |load: &mut WeekdayLoad, (day, minutes)| {
                load.weekday = Some(day.weekday());
                load.minutes += *minutes;
                load.days += 1;
            },
        )
        .into_values()
        .filter_map(|load| {
            load.weekday.map(|weekday| DayDistribution {
                day: weekday_name(weekday).to_string(),
                avg_minutes: ratio(load.minutes as f64, load.days as f64),
                total_minutes: load.minutes,
            })
        })
        .collect();

    let overtime = user_day_overtime(&measured, policy.expected_daily_minutes);
    let users_with_overtime: BTreeSet<_> = overtime.keys().map(|(user, _)| *user).collect();

    WorkloadAnalysis {
        avg_daily_minutes,
        avg_weekly_minutes: avg_daily_minutes * WORK_DAYS_PER_WEEK,
        peak_day_minutes: peak.map_or(0, |(_, minutes)| minutes),
        peak_day: peak.map(|(day, _)| day),
        distribution_by_day,
        total_overtime: overtime.values().sum(),
        users_with_overtime: users_with_overtime.len(),
    }
}
