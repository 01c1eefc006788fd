use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::kpi::{AdminKpiDashboard, TeamKpiSummary, UserKpiSummary},
    state::AppState,
    types::{TeamId, UserId},
};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KpiQuery {
    /// User UUID.
    pub user_id: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub from: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub to: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Rejected query or path input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid {0} date, expected YYYY-MM-DD")]
    Date(&'static str),
    #[error("invalid {0}, expected a UUID")]
    Id(&'static str),
}

impl From<ParamError> for AppError {
    fn from(err: ParamError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Unparseable dates count as absent.
fn lenient_date(raw: Option<&str>) -> Option<NaiveDate> {
    non_empty(raw).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn strict_date(raw: Option<&str>, field: &'static str) -> Result<Option<NaiveDate>, ParamError> {
    non_empty(raw)
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ParamError::Date(field)))
        .transpose()
}

fn parse_id<T: std::str::FromStr>(raw: &str, field: &'static str) -> Result<T, ParamError> {
    raw.trim().parse().map_err(|_| ParamError::Id(field))
}

/// Absent ids stay absent; present ones must parse.
fn optional_id<T: std::str::FromStr>(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<T>, ParamError> {
    non_empty(raw).map(|s| parse_id(s, field)).transpose()
}

pub async fn user_summary(
    State(state): State<AppState>,
    Query(params): Query<KpiQuery>,
) -> Result<Json<UserKpiSummary>, AppError> {
    let user_id = non_empty(params.user_id.as_deref()).and_then(|s| s.parse::<UserId>().ok());
    let summary = state
        .kpi
        .user_summary(
            user_id,
            lenient_date(params.from.as_deref()),
            lenient_date(params.to.as_deref()),
        )
        .await?;
    Ok(Json(summary))
}

pub async fn export_user_summary(
    State(state): State<AppState>,
    Query(params): Query<KpiQuery>,
) -> Result<Response, AppError> {
    let user_id: Option<UserId> = optional_id(params.user_id.as_deref(), "userId")?;
    let from = strict_date(params.from.as_deref(), "from")?;
    let to = strict_date(params.to.as_deref(), "to")?;

    let csv = state.kpi.export_user_csv(user_id, from, to).await?;
    let filename = match user_id {
        Some(id) => format!("kpi_{id}.csv"),
        None => "kpi_summary.csv".to_string(),
    };
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, csv).into_response())
}

pub async fn team_summary(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<TeamKpiSummary>, AppError> {
    let team_id: TeamId = parse_id(&team_id, "team id")?;
    let summary = state
        .kpi
        .team_summary(
            team_id,
            lenient_date(params.from.as_deref()),
            lenient_date(params.to.as_deref()),
        )
        .await?;
    Ok(Json(summary))
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<AdminKpiDashboard>, AppError> {
    let dashboard = state
        .kpi
        .admin_dashboard(
            lenient_date(params.from.as_deref()),
            lenient_date(params.to.as_deref()),
        )
        .await?;
    Ok(Json(dashboard))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/kpi/users/summary", get(user_summary))
        .route("/api/kpi/users/export", get(export_user_summary))
        .route("/api/kpi/teams/{team_id}/summary", get(team_summary))
        .route("/api/kpi/admin/dashboard", get(admin_dashboard))
}
