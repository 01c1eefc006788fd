#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    handlers::kpi::{KpiQuery, WindowQuery},
    models::kpi::{
        AdminKpiDashboard, AdminKpiSummary, AnomalyKind, ComplianceAnomaly, ComplianceMetrics,
        CoveragePoint, DateRange, DayDistribution, KpiPoint, OvertimeByPeriod, OvertimeReport,
        ProductivityMetrics, ProductivityTrend, PunctualityMetrics, PunctualityTrend, Severity,
        TeamDetailedReport, TeamKpiSummary, TeamMemberContribution, UserKpiSummary,
        UserOvertimeDetail, UserProductivityDetail, WorkloadAnalysis, WorkloadDistribution,
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        user_summary_doc,
        user_export_doc,
        team_summary_doc,
        admin_dashboard_doc
    ),
    components(
        schemas(
            ErrorResponse,
            KpiQuery,
            WindowQuery,
            // user
            KpiPoint,
            UserKpiSummary,
            // team
            CoveragePoint,
            TeamKpiSummary,
            // dashboard
            DateRange,
            AdminKpiSummary,
            DayDistribution,
            WorkloadAnalysis,
            PunctualityTrend,
            PunctualityMetrics,
            UserOvertimeDetail,
            OvertimeByPeriod,
            OvertimeReport,
            AnomalyKind,
            Severity,
            ComplianceAnomaly,
            ComplianceMetrics,
            UserProductivityDetail,
            ProductivityTrend,
            ProductivityMetrics,
            TeamMemberContribution,
            WorkloadDistribution,
            TeamDetailedReport,
            AdminKpiDashboard
        )
    ),
    tags(
        (name = "KPI", description = "Attendance KPIs per user, team and organisation"),
        (name = "System", description = "Service health")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, body = serde_json::Value)),
    tag = "System"
)]
fn health_doc() {}

#[utoipa::path(
    get,
    path = "/api/kpi/users/summary",
    params(KpiQuery),
    responses((status = 200, body = UserKpiSummary)),
    tag = "KPI"
)]
fn user_summary_doc() {}

#[utoipa::path(
    get,
    path = "/api/kpi/users/export",
    params(KpiQuery),
    responses(
        (status = 200, description = "Summary as CSV", content_type = "text/csv", body = String),
        (status = 400, description = "Malformed user id or date", body = ErrorResponse)
    ),
    tag = "KPI"
)]
fn user_export_doc() {}

#[utoipa::path(
    get,
    path = "/api/kpi/teams/{team_id}/summary",
    params(
        ("team_id" = String, Path, description = "Team UUID"),
        WindowQuery
    ),
    responses(
        (status = 200, body = TeamKpiSummary),
        (status = 400, description = "Invalid team id", body = ErrorResponse)
    ),
    tag = "KPI"
)]
fn team_summary_doc() {}

#[utoipa::path(
    get,
    path = "/api/kpi/admin/dashboard",
    params(WindowQuery),
    responses((status = 200, body = AdminKpiDashboard)),
    tag = "KPI"
)]
fn admin_dashboard_doc() {}
