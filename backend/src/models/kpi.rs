//! Response types produced by the KPI engine.
//!
//! All of these are built per request and never persisted. Field names are
//! camelCase on the wire.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::{TeamId, UserId};

/// Minutes worked on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiPoint {
    pub date: NaiveDate,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserKpiSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Absent when no user was requested.
    #[schema(value_type = Option<String>)]
    pub user_id: Option<UserId>,
    pub worked_minutes: i64,
    pub overtime_minutes: i64,
    pub days_present: usize,
    pub current_streak_days: usize,
    pub punctuality_rate: f64,
    pub present_now: bool,
    pub daily_worked: Vec<KpiPoint>,
}

/// Concurrent headcount for the hour starting at `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoveragePoint {
    pub time: NaiveDateTime,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamKpiSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[schema(value_type = String)]
    pub team_id: TeamId,
    pub total_worked_minutes: i64,
    pub avg_worked_minutes_per_user: f64,
    pub active_users: usize,
    pub coverage: Vec<CoveragePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminKpiSummary {
    pub total_users: usize,
    pub active_users: usize,
    pub total_teams: usize,
    pub total_worked_hours: i64,
    pub avg_hours_per_user: f64,
    pub compliance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayDistribution {
    /// English weekday name, e.g. `Monday`.
    pub day: String,
    pub avg_minutes: f64,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadAnalysis {
    pub avg_daily_minutes: f64,
    pub avg_weekly_minutes: f64,
    pub peak_day_minutes: i64,
    pub peak_day: Option<NaiveDate>,
    pub distribution_by_day: Vec<DayDistribution>,
    pub total_overtime: i64,
    pub users_with_overtime: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunctualityTrend {
    pub week_start: NaiveDate,
    pub on_time_rate: f64,
    pub avg_late_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunctualityMetrics {
    pub on_time_rate: f64,
    pub late_rate: f64,
    pub avg_late_minutes: f64,
    pub total_late_incidents: usize,
    pub punctual_users: usize,
    pub late_users: usize,
    pub trend_by_week: Vec<PunctualityTrend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOvertimeDetail {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub user_name: String,
    pub overtime_minutes: i64,
    pub days_worked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeByPeriod {
    pub period_start: NaiveDate,
    pub total_minutes: i64,
    pub users_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeReport {
    pub total_overtime_minutes: i64,
    pub avg_overtime_per_user: f64,
    pub users_with_overtime: usize,
    pub top_overtime_users: Vec<UserOvertimeDetail>,
    pub overtime_by_week: Vec<OvertimeByPeriod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingClockout,
    ExcessiveHours,
    WeekendWork,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl AnomalyKind {
    pub fn severity(self) -> Severity {
        match self {
            AnomalyKind::MissingClockout => Severity::Medium,
            AnomalyKind::ExcessiveHours => Severity::High,
            AnomalyKind::WeekendWork => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAnomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub count: usize,
    pub severity: Severity,
    pub affected_users: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMetrics {
    pub incomplete_entries_count: usize,
    pub anomalies_count: usize,
    pub compliance_rate: f64,
    pub users_with_issues: usize,
    pub anomalies: Vec<ComplianceAnomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProductivityDetail {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub user_name: String,
    pub efficiency_rate: f64,
    pub total_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityTrend {
    pub date: NaiveDate,
    pub avg_efficiency: f64,
    pub total_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityMetrics {
    pub avg_efficiency_rate: f64,
    pub total_productive_hours: i64,
    pub avg_hours_per_user: f64,
    pub top_performers: Vec<UserProductivityDetail>,
    pub productivity_trend: Vec<ProductivityTrend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberContribution {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub user_name: String,
    pub worked_minutes: i64,
    pub days_present: usize,
    pub overtime_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDistribution {
    pub range: String,
    pub user_count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailedReport {
    #[schema(value_type = String)]
    pub team_id: TeamId,
    pub team_name: String,
    pub member_count: usize,
    pub total_worked_minutes: i64,
    pub avg_minutes_per_member: f64,
    pub active_now: usize,
    pub top_contributors: Vec<TeamMemberContribution>,
    pub workload_distribution: Vec<WorkloadDistribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminKpiDashboard {
    pub period: DateRange,
    pub summary: AdminKpiSummary,
    pub workload: WorkloadAnalysis,
    pub punctuality: PunctualityMetrics,
    pub overtime: OvertimeReport,
    pub compliance: ComplianceMetrics,
    pub productivity: ProductivityMetrics,
    pub teams: Vec<TeamDetailedReport>,
}
