use std::sync::Arc;

use crate::advisory::AdvisoryService;

/// Shared, immutable gateway state
pub struct AppState {
    pub advisory: AdvisoryService,
}

impl AppState {
    pub fn new(advisory: AdvisoryService) -> Arc<Self> {
        Arc::new(Self { advisory })
    }

    pub fn is_configured(&self) -> bool {
        self.advisory.is_configured()
    }
}
