use database::MonitorStore;
use reddit_client::PostSource;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MonitorStore>,
    pub posts: Arc<dyn PostSource>,
}

impl AppState {
    pub fn new(store: Arc<dyn MonitorStore>, posts: Arc<dyn PostSource>) -> Self {
        Self { store, posts }
    }
}
