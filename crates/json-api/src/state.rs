//! State

use std::sync::Arc;

use dryci_app::domain::passes::PassesService;

pub(crate) struct State {
    pub(crate) passes: Arc<dyn PassesService>,
}

impl State {
    #[must_use]
    pub(crate) fn new(passes: Arc<dyn PassesService>) -> Self {
        Self { passes }
    }

    #[must_use]
    pub(crate) fn shared(passes: Arc<dyn PassesService>) -> Arc<Self> {
        Arc::new(Self::new(passes))
    }
}
