//! Read-side repository the KPI engine pulls entries and teams from.
//!
//! The engine only ever reads through [`KpiRepositoryTrait`]; the trait can be
//! mocked with mockall or replaced by [`KpiRepositoryStub`] in tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::db::connection::DbPool;
use crate::error::AppError;
use crate::models::{team::Team, time_entry::TimeEntry};
use crate::types::{EntryId, TeamId, UserId};

/// Optional keys the entry query is narrowed by. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub user_id: Option<UserId>,
    pub team_id: Option<TeamId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn window(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn for_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    fn accepts_day(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

/// Repository trait for the KPI engine's inputs.
///
/// Use `MockKpiRepositoryTrait` in unit tests to mock the behavior.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KpiRepositoryTrait: Send + Sync {
    /// Entries matching the filter, ordered by day then arrival.
    async fn fetch_entries(&self, filter: EntryFilter) -> Result<Vec<TimeEntry>, AppError>;

    /// Every team in the organisation.
    async fn fetch_teams(&self) -> Result<Vec<Team>, AppError>;

    /// A single team by ID.
    async fn fetch_team_by_id(&self, id: TeamId) -> Result<Team, AppError>;
}

/// PostgreSQL implementation of [`KpiRepositoryTrait`].
#[derive(Debug, Clone)]
pub struct PgKpiRepository {
    pool: DbPool,
}

impl PgKpiRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    user_id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    day: NaiveDate,
    arrival: NaiveDateTime,
    departure: Option<NaiveDateTime>,
    status: bool,
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    description: Option<String>,
}

impl From<EntryRow> for TimeEntry {
    fn from(row: EntryRow) -> Self {
        TimeEntry {
            id: EntryId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            user_name: join_name(row.first_name.as_deref(), row.last_name.as_deref()),
            day: row.day,
            arrival: row.arrival,
            // Legacy rows carry the zero timestamp instead of NULL.
            departure: row.departure.filter(|d| d.year() > 1),
            status: row.status,
        }
    }
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            id: TeamId::from_uuid(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[async_trait]
impl KpiRepositoryTrait for PgKpiRepository {
    async fn fetch_entries(&self, filter: EntryFilter) -> Result<Vec<TimeEntry>, AppError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT e.id, e.user_id, u.first_name, u.last_name,
                   e.day, e.arrival, e.departure, e.status
            FROM time_table_entries e
            LEFT JOIN users u ON u.id = e.user_id
            WHERE ($1::uuid IS NULL OR e.user_id = $1)
              AND ($2::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM team_users tu
                    WHERE tu.user_id = e.user_id AND tu.team_id = $2))
              AND ($3::date IS NULL OR e.day >= $3)
              AND ($4::date IS NULL OR e.day <= $4)
            ORDER BY e.day, e.arrival
            "#,
        )
        .bind(filter.user_id.map(Uuid::from))
        .bind(filter.team_id.map(Uuid::from))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(TimeEntry::from).collect())
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, description FROM teams ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn fetch_team_by_id(&self, id: TeamId) -> Result<Team, AppError> {
        sqlx::query_as::<_, TeamRow>("SELECT id, name, description FROM teams WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await?
            .map(Team::from)
            .ok_or_else(|| AppError::NotFound("Team not found".into()))
    }
}

/// In-memory repository used by integration tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct KpiRepositoryStub {
    entries: Vec<TimeEntry>,
    teams: Vec<Team>,
    members: HashMap<TeamId, HashSet<UserId>>,
    unresolvable_teams: HashSet<TeamId>,
    fail_entries: bool,
}

impl KpiRepositoryStub {
    pub fn new(entries: impl IntoIterator<Item = TimeEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Registers a team and the users belonging to it.
    pub fn with_team(mut self, team: Team, members: impl IntoIterator<Item = UserId>) -> Self {
        self.members
            .entry(team.id)
            .or_default()
            .extend(members);
        self.teams.push(team);
        self
    }

    /// Lists the team in `fetch_teams` but fails its lookup by ID.
    pub fn with_unresolvable_team(mut self, team: Team) -> Self {
        self.unresolvable_teams.insert(team.id);
        self.teams.push(team);
        self
    }

    /// Makes every `fetch_entries` call fail.
    pub fn failing_entries(mut self) -> Self {
        self.fail_entries = true;
        self
    }
}

#[async_trait]
impl KpiRepositoryTrait for KpiRepositoryStub {
    async fn fetch_entries(&self, filter: EntryFilter) -> Result<Vec<TimeEntry>, AppError> {
        if self.fail_entries {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "entry store unavailable"
            )));
        }

        let team_members = filter.team_id.map(|team_id| self.members.get(&team_id));
        let mut entries: Vec<TimeEntry> = self
            .entries
            .iter()
            .filter(|e| filter.user_id.map_or(true, |user_id| e.user_id == user_id))
            .filter(|e| match team_members {
                None => true,
                Some(Some(members)) => members.contains(&e.user_id),
                Some(None) => false,
            })
            .filter(|e| filter.accepts_day(e.day))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.day, e.arrival));
        Ok(entries)
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, AppError> {
        Ok(self.teams.clone())
    }

    async fn fetch_team_by_id(&self, id: TeamId) -> Result<Team, AppError> {
        if self.unresolvable_teams.contains(&id) {
            return Err(AppError::NotFound("Team not found".into()));
        }
        self.teams
            .iter()
            .find(|team| team.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Team not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: UserId, day: NaiveDate) -> TimeEntry {
        TimeEntry {
            id: EntryId::new(),
            user_id,
            user_name: None,
            day,
            arrival: day.and_hms_opt(9, 0, 0).unwrap(),
            departure: day.and_hms_opt(17, 0, 0),
            status: false,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn join_name_trims_missing_parts() {
        assert_eq!(join_name(Some("Ada"), Some("Lovelace")).as_deref(), Some("Ada Lovelace"));
        assert_eq!(join_name(Some("Ada"), None).as_deref(), Some("Ada"));
        assert_eq!(join_name(None, None), None);
    }

    #[test]
    fn zero_departure_is_read_as_missing() {
        let row = EntryRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: None,
            last_name: None,
            day: day(10),
            arrival: day(10).and_hms_opt(9, 0, 0).unwrap(),
            departure: NaiveDate::from_ymd_opt(1, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            status: false,
        };
        let entry = TimeEntry::from(row);
        assert_eq!(entry.departure, None);
    }

    #[tokio::test]
    async fn stub_filters_by_user_team_and_inclusive_window() {
        let alice = UserId::new();
        let bob = UserId::new();
        let team = Team {
            id: TeamId::new(),
            name: "Ops".into(),
            description: None,
        };
        let repo = KpiRepositoryStub::new([
            entry(alice, day(1)),
            entry(alice, day(5)),
            entry(bob, day(5)),
            entry(bob, day(9)),
        ])
        .with_team(team.clone(), [bob]);

        let window = EntryFilter::window(day(1), day(5));
        assert_eq!(repo.fetch_entries(window).await.unwrap().len(), 3);
        assert_eq!(
            repo.fetch_entries(window.for_user(alice)).await.unwrap().len(),
            2
        );
        let team_entries = repo.fetch_entries(window.for_team(team.id)).await.unwrap();
        assert_eq!(team_entries.len(), 1);
        assert_eq!(team_entries[0].user_id, bob);
    }

    #[tokio::test]
    async fn stub_unknown_team_yields_no_entries_and_not_found() {
        let repo = KpiRepositoryStub::new([entry(UserId::new(), day(1))]);
        let missing = TeamId::new();
        let entries = repo
            .fetch_entries(EntryFilter::default().for_team(missing))
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert!(matches!(
            repo.fetch_team_by_id(missing).await,
            Err(AppError::NotFound(_))
        ));
    }
}
