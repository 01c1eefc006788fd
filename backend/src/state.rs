use std::sync::Arc;

use crate::services::kpi::KpiService;

#[derive(Clone)]
pub struct AppState {
    pub kpi: Arc<KpiService>,
}

impl AppState {
    pub fn new(kpi: KpiService) -> Self {
        Self { kpi: Arc::new(kpi) }
    }
}
