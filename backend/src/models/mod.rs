//! Data models shared across the repository layer, the KPI engine and the API handlers.

pub mod kpi;
pub mod team;
pub mod time_entry;
