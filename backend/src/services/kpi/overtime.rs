use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::models::kpi::{OvertimeByPeriod, OvertimeReport, UserOvertimeDetail};
use crate::models::time_entry::TimeEntry;
use crate::types::UserId;

use super::grouping::{display_names, measure, ratio, user_day_overtime, week_start, GroupExt};
use super::{KpiPolicy, TOP_LIST_LIMIT};

/// Minutes worked beyond the quota for the days present, never negative.
pub fn overtime_minutes(worked_minutes: i64, days_present: usize, policy: &KpiPolicy) -> i64 {
    let expected = i64::try_from(days_present)
        .unwrap_or(i64::MAX)
        .saturating_mul(policy.expected_daily_minutes);
    (worked_minutes - expected).max(0)
}

#[derive(Default)]
struct UserOvertime {
    minutes: i64,
    days: usize,
}

#[derive(Default)]
struct WeekOvertime {
    minutes: i64,
    users: BTreeSet<UserId>,
}

/// Organisation-wide overtime, measured per user-day above the quota.
///
/// `users_in_window` is the averaging base: every user with an entry, not
/// just those with overtime.
pub fn overtime_report(
    entries: &[TimeEntry],
    users_in_window: usize,
    now: NaiveDateTime,
    policy: &KpiPolicy,
) -> OvertimeReport {
    let measured = measure(entries, now);
    let per_user_day = user_day_overtime(&measured, policy.expected_daily_minutes);
    let names = display_names(entries);

    let per_user = per_user_day.iter().group_reduce(
        |(key, _)| key.0,
        |acc: &mut UserOvertime, (_, minutes)| {
            acc.minutes += *minutes;
            acc.days += 1;
        },
    );
    let overtime_by_week = per_user_day
        .iter()
        .group_reduce(
            |(key, _)| week_start(key.1),
            |acc: &mut WeekOvertime, (key, minutes)| {
                acc.minutes += *minutes;
                acc.users.insert(key.0);
            },
        )
        .into_iter()
        .map(|(period_start, week)| OvertimeByPeriod {
            period_start,
            total_minutes: week.minutes,
            users_count: week.users.len(),
        })
        .collect();

    let total_overtime_minutes: i64 = per_user.values().map(|u| u.minutes).sum();
    let mut top_overtime_users: Vec<UserOvertimeDetail> = per_user
        .iter()
        .map(|(user_id, acc)| UserOvertimeDetail {
            user_id: *user_id,
            user_name: names.get(user_id).cloned().unwrap_or_default(),
            overtime_minutes: acc.minutes,
            days_worked: acc.days,
        })
        .collect();
    top_overtime_users.sort_by(|a, b| {
        b.overtime_minutes
            .cmp(&a.overtime_minutes)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    top_overtime_users.truncate(TOP_LIST_LIMIT);

    OvertimeReport {
        total_overtime_minutes,
        avg_overtime_per_user: ratio(total_overtime_minutes as f64, users_in_window as f64),
        users_with_overtime: per_user.len(),
        top_overtime_users,
        overtime_by_week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryId;
    use chrono::{Duration, NaiveDate};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn worked(user_id: UserId, d: u32, minutes: i64) -> TimeEntry {
        let arrival = day(d).and_hms_opt(8, 0, 0).unwrap();
        TimeEntry {
            id: EntryId::new(),
            user_id,
            user_name: Some(format!("user {d}")),
            day: day(d),
            arrival,
            departure: Some(arrival + Duration::minutes(minutes)),
            status: false,
        }
    }

    fn now() -> NaiveDateTime {
        day(31).and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn summary_overtime_is_floored() {
        let policy = KpiPolicy::default();
        assert_eq!(overtime_minutes(930, 2, &policy), 90);
        assert_eq!(overtime_minutes(840, 2, &policy), 0);
        assert_eq!(overtime_minutes(100, 2, &policy), 0);
        assert_eq!(overtime_minutes(0, 0, &policy), 0);
    }

    #[test]
    fn report_ranks_users_and_groups_weeks() {
        let heavy = UserId::new();
        let light = UserId::new();
        let none = UserId::new();
        let entries = vec![
            // Monday 2024-01-08 and Tuesday 2024-01-09.
            worked(heavy, 8, 540),
            worked(heavy, 9, 480),
            worked(light, 9, 450),
            // Monday 2024-01-15.
            worked(heavy, 15, 600),
            worked(none, 15, 400),
        ];
        let report = overtime_report(&entries, 3, now(), &KpiPolicy::default());

        assert_eq!(report.total_overtime_minutes, 120 + 60 + 30 + 180);
        assert_eq!(report.users_with_overtime, 2);
        assert_eq!(report.avg_overtime_per_user, 130.0);

        assert_eq!(report.top_overtime_users[0].user_id, heavy);
        assert_eq!(report.top_overtime_users[0].overtime_minutes, 360);
        assert_eq!(report.top_overtime_users[0].days_worked, 3);
        assert_eq!(report.top_overtime_users[1].user_id, light);

        assert_eq!(report.overtime_by_week.len(), 2);
        assert_eq!(report.overtime_by_week[0].period_start, day(8));
        assert_eq!(report.overtime_by_week[0].total_minutes, 210);
        assert_eq!(report.overtime_by_week[0].users_count, 2);
        assert_eq!(report.overtime_by_week[1].users_count, 1);
    }

    #[test]
    fn top_users_are_capped() {
        let entries: Vec<_> = (0..15).map(|_| worked(UserId::new(), 8, 500)).collect();
        let report = overtime_report(&entries, 15, now(), &KpiPolicy::default());
        assert_eq!(report.users_with_overtime, 15);
        assert_eq!(report.top_overtime_users.len(), TOP_LIST_LIMIT);
    }

    #[test]
    fn empty_report_is_zeroed() {
        let report = overtime_report(&[], 0, now(), &KpiPolicy::default());
        assert_eq!(report.total_overtime_minutes, 0);
        assert_eq!(report.avg_overtime_per_user, 0.0);
        assert!(report.top_overtime_users.is_empty());
        assert!(report.overtime_by_week.is_empty());
    }
}
