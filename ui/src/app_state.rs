use api::contract::TipConfig;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
pub struct AppStateData {
    pub config: TipConfig,
}

/// Immutable, cheaply clonable state shared through the Dioxus context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState(Arc<AppStateData>);

impl Deref for AppState {
    type Target = AppStateData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AppState {
    pub fn new(config: TipConfig) -> Self {
        Self(Arc::new(AppStateData { config }))
    }
}
