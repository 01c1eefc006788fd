use std::collections::BTreeSet;

use chrono::{Datelike, Weekday};

use crate::models::kpi::{AnomalyKind, ComplianceAnomaly, ComplianceMetrics};
use crate::models::time_entry::TimeEntry;

use super::grouping::ratio;
use super::KpiPolicy;

/// Report order of the anomaly classes.
pub const ANOMALY_KINDS: [AnomalyKind; 3] = [
    AnomalyKind::MissingClockout,
    AnomalyKind::ExcessiveHours,
    AnomalyKind::WeekendWork,
];

pub fn has_anomaly(entry: &TimeEntry, kind: AnomalyKind, policy: &KpiPolicy) -> bool {
    match kind {
        AnomalyKind::MissingClockout => entry.span().is_stale(),
        AnomalyKind::ExcessiveHours => entry
            .span()
            .closed_minutes()
            .is_some_and(|minutes| minutes > policy.excessive_session_minutes),
        AnomalyKind::WeekendWork => matches!(entry.day.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

/// Share of entries that carry a departure.
pub fn compliance_rate(entries: &[TimeEntry]) -> f64 {
    let closed = entries.iter().filter(|e| e.span().is_closed()).count();
    ratio(closed as f64, entries.len() as f64)
}

pub fn compliance_metrics(entries: &[TimeEntry], policy: &KpiPolicy) -> ComplianceMetrics {
    let anomalies: Vec<ComplianceAnomaly> = ANOMALY_KINDS
        .iter()
        .map(|&kind| {
            let flagged: Vec<&TimeEntry> = entries
                .iter()
                .filter(|e| has_anomaly(e, kind, policy))
                .collect();
            let affected: BTreeSet<_> = flagged.iter().map(|e| e.user_id).collect();
            ComplianceAnomaly {
                kind,
                count: flagged.len(),
                severity: kind.severity(),
                affected_users: affected.len(),
            }
        })
        .collect();

    let users_with_issues: BTreeSet<_> = entries
        .iter()
        .filter(|e| ANOMALY_KINDS.iter().any(|&k| has_anomaly(e, k, policy)))
        .map(|e| e.user_id)
        .collect();

    ComplianceMetrics {
        incomplete_entries_count: anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::MissingClockout)
            .map_or(0, |a| a.count),
        anomalies_count: anomalies.iter().map(|a| a.count).sum(),
        compliance_rate: compliance_rate(entries),
        users_with_issues: users_with_issues.len(),
        anomalies,
    }
}
