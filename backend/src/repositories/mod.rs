//! Repository layer.

pub mod kpi_repository;

pub use kpi_repository::{EntryFilter, KpiRepositoryStub, KpiRepositoryTrait, PgKpiRepository};
