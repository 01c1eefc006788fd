use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::kpi::{
    TeamDetailedReport, TeamKpiSummary, TeamMemberContribution, WorkloadDistribution,
};
use crate::models::team::Team;
use crate::models::time_entry::TimeEntry;
use crate::types::TeamId;

use super::coverage::coverage;
use super::grouping::{
    display_names, distinct_users, measure, open_users, ratio, user_day_minutes, GroupExt,
};
use super::window::TimeWindow;
use super::KpiPolicy;

pub const TOP_CONTRIBUTORS: usize = 5;

/// Hour bands members are sorted into by total worked hours: `[lower, upper)`.
/// Each band reports its share of members as a fraction in `[0, 1]`.
const WORKLOAD_BANDS: [(&str, i64, Option<i64>); 3] = [
    ("0-40h", 0, Some(40)),
    ("40-50h", 40, Some(50)),
    ("50+h", 50, None),
];

pub fn team_summary(
    team_id: TeamId,
    window: &TimeWindow,
    entries: &[TimeEntry],
    now: NaiveDateTime,
) -> TeamKpiSummary {
    let total_worked_minutes: i64 = entries
        .iter()
        .filter_map(|e| {
            let span = e.span();
            let end = span.effective_end(now)?;
            (end >= span.arrival()).then(|| (end - span.arrival()).num_minutes())
        })
        .sum();
    let users = distinct_users(entries).len();

    TeamKpiSummary {
        from: window.start,
        to: window.end,
        team_id,
        total_worked_minutes,
        avg_worked_minutes_per_user: ratio(total_worked_minutes as f64, users as f64),
        active_users: open_users(entries).len(),
        coverage: coverage(entries, window, now),
    }
}

#[derive(Default)]
struct MemberTally {
    minutes: i64,
    days: BTreeSet<NaiveDate>,
    overtime: i64,
}

pub fn team_detailed_report(
    team: &Team,
    entries: &[TimeEntry],
    now: NaiveDateTime,
    policy: &KpiPolicy,
) -> TeamDetailedReport {
    let measured = measure(entries, now);
    let names = display_names(entries);
    let members = user_day_minutes(&measured).into_iter().group_reduce(
        |((user, _), _)| *user,
        |tally: &mut MemberTally, ((_, day), minutes)| {
            tally.minutes += minutes;
            tally.days.insert(day);
            tally.overtime += (minutes - policy.expected_daily_minutes).max(0);
        },
    );

    let total_worked_minutes: i64 = members.values().map(|m| m.minutes).sum();
    let member_count = members.len();

    let workload_distribution = WORKLOAD_BANDS
        .iter()
        .map(|&(range, lower, upper)| {
            let user_count = members
                .values()
                .map(|m| m.minutes / 60)
                .filter(|&hours| hours >= lower && upper.map_or(true, |u| hours < u))
                .count();
            WorkloadDistribution {
                range: range.to_string(),
                user_count,
                percentage: ratio(user_count as f64, member_count as f64),
            }
        })
        .collect();

    let mut top_contributors: Vec<TeamMemberContribution> = members
        .iter()
        .map(|(user_id, tally)| TeamMemberContribution {
            user_id: *user_id,
            user_name: names.get(user_id).cloned().unwrap_or_default(),
            worked_minutes: tally.minutes,
            days_present: tally.days.len(),
            overtime_minutes: tally.overtime,
        })
        .collect();
    top_contributors.sort_by(|a, b| {
        b.worked_minutes
            .cmp(&a.worked_minutes)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    top_contributors.truncate(TOP_CONTRIBUTORS);

    TeamDetailedReport {
        team_id: team.id,
        team_name: team.name.clone(),
        member_count,
        total_worked_minutes,
        avg_minutes_per_member: ratio(total_worked_minutes as f64, member_count as f64),
        active_now: open_users(entries).len(),
        top_contributors,
        workload_distribution,
    }
}
