//! KPI aggregation engine.
//!
//! [`KpiService`] fetches entries through [`KpiRepositoryTrait`], reads the
//! clock once, and hands the same `now` to every analyzer. The analyzers
//! themselves are pure functions over an entry slice.

pub mod compliance;
pub mod coverage;
pub mod daily;
pub mod export;
pub mod grouping;
pub mod overtime;
pub mod productivity;
pub mod punctuality;
pub mod summary;
pub mod team_report;
pub mod window;
pub mod workload;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::AppError;
use crate::models::kpi::{AdminKpiDashboard, TeamKpiSummary, UserKpiSummary};
use crate::repositories::KpiRepositoryTrait;
use crate::types::{TeamId, UserId};
use crate::utils::time::Clock;

pub use window::TimeWindow;

/// Length of the top-N lists in the overtime and productivity reports.
pub const TOP_LIST_LIMIT: usize = 10;

/// Fixed thresholds the analyzers measure against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiPolicy {
    /// Latest punctual arrival, on the arrival's own day.
    pub punctuality_threshold: NaiveTime,
    pub expected_daily_minutes: i64,
    /// Closed sessions longer than this are flagged.
    pub excessive_session_minutes: i64,
}

impl Default for KpiPolicy {
    fn default() -> Self {
        Self {
            punctuality_threshold: NaiveTime::MIN + Duration::hours(10),
            expected_daily_minutes: 7 * 60,
            excessive_session_minutes: 12 * 60,
        }
    }
}

#[derive(Clone)]
pub struct KpiService {
    repository: Arc<dyn KpiRepositoryTrait>,
    clock: Arc<dyn Clock>,
    policy: KpiPolicy,
}

impl KpiService {
    pub fn new(repository: Arc<dyn KpiRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            policy: KpiPolicy::default(),
        }
    }

    /// Summary for one user. Without a user the summary is zero-valued and
    /// the repository is not consulted.
    pub async fn user_summary(
        &self,
        user_id: Option<UserId>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<UserKpiSummary, AppError> {
        let now = self.clock.now();
        let window = TimeWindow::normalize(from, to, now.date());

        let entries = match user_id {
            Some(user_id) => {
                self.repository
                    .fetch_entries(window.filter().for_user(user_id))
                    .await?
            }
            None => Vec::new(),
        };
        tracing::debug!(
            user_id = ?user_id,
            from = %window.start,
            to = %window.end,
            entries = entries.len(),
            "Computing user KPI summary"
        );

        Ok(summary::user_summary(
            user_id,
            &window,
            &entries,
            now,
            &self.policy,
        ))
    }

    /// The user summary rendered as a two-line CSV document.
    pub async fn export_user_csv(
        &self,
        user_id: Option<UserId>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<String, AppError> {
        let summary = self.user_summary(user_id, from, to).await?;
        export::summary_csv(&summary)
    }

    pub async fn team_summary(
        &self,
        team_id: TeamId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<TeamKpiSummary, AppError> {
        let now = self.clock.now();
        let window = TimeWindow::normalize(from, to, now.date());
        let entries = self
            .repository
            .fetch_entries(window.filter().for_team(team_id))
            .await?;
        tracing::debug!(
            team_id = %team_id,
            from = %window.start,
            to = %window.end,
            entries = entries.len(),
            "Computing team KPI summary"
        );

        Ok(team_report::team_summary(team_id, &window, &entries, now))
    }

    /// Organisation dashboard.
    ///
    /// Any entry or team-list fetch failure fails the whole dashboard. A team
    /// whose lookup by ID fails is left out of `teams`.
    pub async fn admin_dashboard(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<AdminKpiDashboard, AppError> {
        let now = self.clock.now();
        let window = TimeWindow::normalize(from, to, now.date());
        let policy = &self.policy;

        let entries = self.repository.fetch_entries(window.filter()).await?;
        let teams = self.repository.fetch_teams().await?;
        let users_in_window = grouping::distinct_users(&entries).len();
        tracing::debug!(
            from = %window.start,
            to = %window.end,
            entries = entries.len(),
            users = users_in_window,
            teams = teams.len(),
            "Computing admin KPI dashboard"
        );

        let mut team_reports = Vec::with_capacity(teams.len());
        for listed in &teams {
            let team = match self.repository.fetch_team_by_id(listed.id).await {
                Ok(team) => team,
                Err(err) => {
                    tracing::warn!(team_id = %listed.id, error = %err, "Skipping team report");
                    continue;
                }
            };
            let team_entries = self
                .repository
                .fetch_entries(window.filter().for_team(team.id))
                .await?;
            team_reports.push(team_report::team_detailed_report(
                &team,
                &team_entries,
                now,
                policy,
            ));
        }

        Ok(AdminKpiDashboard {
            period: window.as_range(),
            summary: summary::admin_summary(&entries, teams.len(), now),
            workload: workload::workload_analysis(&entries, now, policy),
            punctuality: punctuality::punctuality_metrics(&entries, policy),
            overtime: overtime::overtime_report(&entries, users_in_window, now, policy),
            compliance: compliance::compliance_metrics(&entries, policy),
            productivity: productivity::productivity_metrics(&entries, now, policy),
            teams: team_reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::Team;
    use crate::models::time_entry::TimeEntry;
    use crate::repositories::kpi_repository::MockKpiRepositoryTrait;
    use crate::types::EntryId;
    use crate::utils::time::FixedClock;
    use chrono::NaiveDateTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        day(20).and_hms_opt(12, 0, 0).unwrap()
    }

    fn service(repo: MockKpiRepositoryTrait) -> KpiService {
        KpiService::new(Arc::new(repo), Arc::new(FixedClock(now())))
    }

    fn entry(user_id: UserId, d: u32) -> TimeEntry {
        TimeEntry {
            id: EntryId::new(),
            user_id,
            user_name: Some("Ada Lovelace".into()),
            day: day(d),
            arrival: day(d).and_hms_opt(9, 0, 0).unwrap(),
            departure: day(d).and_hms_opt(17, 0, 0),
            status: false,
        }
    }

    fn team(name: &str) -> Team {
        Team {
            id: TeamId::new(),
            name: name.into(),
            description: None,
        }
    }

    fn unavailable() -> AppError {
        AppError::InternalServerError(anyhow::anyhow!("connection reset"))
    }

    #[test]
    fn default_policy_thresholds() {
        let policy = KpiPolicy::default();
        assert_eq!(policy.punctuality_threshold, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(policy.expected_daily_minutes, 420);
        assert_eq!(policy.excessive_session_minutes, 720);
    }

    #[tokio::test]
    async fn user_summary_queries_user_over_default_window() {
        let user = UserId::new();
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries()
            .withf(move |f| {
                f.user_id == Some(user)
                    && f.team_id.is_none()
                    && f.from == Some(day(20) - Duration::days(30))
                    && f.to == Some(day(20))
            })
            .times(1)
            .returning(move |_| Ok(vec![entry(user, 18), entry(user, 19)]));

        let summary = service(repo).user_summary(Some(user), None, None).await.unwrap();
        assert_eq!(summary.worked_minutes, 960);
        assert_eq!(summary.days_present, 2);
        assert_eq!(summary.current_streak_days, 2);
    }

    #[tokio::test]
    async fn user_summary_without_user_skips_repository() {
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries().never();

        let summary = service(repo)
            .user_summary(None, Some(day(10)), Some(day(1)))
            .await
            .unwrap();
        assert_eq!(summary.user_id, None);
        assert_eq!((summary.from, summary.to), (day(1), day(10)));
        assert_eq!(summary.worked_minutes, 0);
    }

    #[tokio::test]
    async fn user_summary_propagates_repository_error() {
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries().returning(|_| Err(unavailable()));

        let result = service(repo).user_summary(Some(UserId::new()), None, None).await;
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }

    #[tokio::test]
    async fn team_summary_filters_by_team() {
        let team_id = TeamId::new();
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries()
            .withf(move |f| f.team_id == Some(team_id) && f.user_id.is_none())
            .times(1)
            .returning(|_| Ok(vec![entry(UserId::new(), 19)]));

        let summary = service(repo).team_summary(team_id, None, None).await.unwrap();
        assert_eq!(summary.team_id, team_id);
        assert_eq!(summary.total_worked_minutes, 480);
        assert_eq!(summary.coverage.len(), 9);
    }

    #[tokio::test]
    async fn export_renders_csv() {
        let user = UserId::new();
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries()
            .returning(move |_| Ok(vec![entry(user, 19)]));

        let csv = service(repo)
            .export_user_csv(Some(user), Some(day(1)), Some(day(20)))
            .await
            .unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, format!("{user},2024-03-01,2024-03-20,480,60,1,1,1.00,false"));
    }

    #[tokio::test]
    async fn dashboard_skips_team_whose_lookup_fails() {
        let user = UserId::new();
        let kept = team("Kept");
        let lost = team("Lost");
        let (kept_id, lost_id) = (kept.id, lost.id);

        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries()
            .withf(|f| f.team_id.is_none())
            .returning(move |_| Ok(vec![entry(user, 19)]));
        repo.expect_fetch_entries()
            .withf(move |f| f.team_id == Some(kept_id))
            .times(1)
            .returning(move |_| Ok(vec![entry(user, 19)]));
        let listed = vec![kept.clone(), lost];
        repo.expect_fetch_teams()
            .returning(move || Ok(listed.clone()));
        repo.expect_fetch_team_by_id()
            .withf(move |id| *id == kept_id)
            .returning(move |_| Ok(kept.clone()));
        repo.expect_fetch_team_by_id()
            .withf(move |id| *id == lost_id)
            .returning(|_| Err(AppError::NotFound("Team not found".into())));

        let dashboard = service(repo).admin_dashboard(None, None).await.unwrap();
        assert_eq!(dashboard.summary.total_teams, 2);
        assert_eq!(dashboard.summary.total_users, 1);
        assert_eq!(dashboard.teams.len(), 1);
        assert_eq!(dashboard.teams[0].team_name, "Kept");
        assert_eq!(dashboard.overtime.total_overtime_minutes, 60);
    }

    #[tokio::test]
    async fn dashboard_fails_when_team_list_fails() {
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries().returning(|_| Ok(vec![]));
        repo.expect_fetch_teams().returning(|| Err(unavailable()));

        let result = service(repo).admin_dashboard(None, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn dashboard_fails_when_team_entries_fail() {
        let listed = team("Ops");
        let ops = listed.clone();
        let mut repo = MockKpiRepositoryTrait::new();
        repo.expect_fetch_entries()
            .withf(|f| f.team_id.is_none())
            .returning(|_| Ok(vec![]));
        repo.expect_fetch_entries()
            .withf(|f| f.team_id.is_some())
            .returning(|_| Err(unavailable()));
        repo.expect_fetch_teams()
            .returning(move || Ok(vec![listed.clone()]));
        repo.expect_fetch_team_by_id()
            .returning(move |_| Ok(ops.clone()));

        let result = service(repo).admin_dashboard(None, None).await;
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }
}
