use std::sync::Arc;
use stratus_core::EmptyLegSearch;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<EmptyLegSearch>,
}

impl AppState {
    pub fn new(search: EmptyLegSearch) -> Self {
        Self { search: Arc::new(search) }
    }
}
