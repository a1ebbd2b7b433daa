use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::attempts::AttemptEngine;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    engine: AttemptEngine,
}

impl AppState {
    pub(crate) fn new(settings: Settings, engine: AttemptEngine) -> Self {
        Self { inner: Arc::new(InnerState { settings, engine }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn engine(&self) -> &AttemptEngine {
        &self.inner.engine
    }
}
