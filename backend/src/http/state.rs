//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::CoilRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository handle built at startup and owned by the router
    pub repository: Arc<dyn CoilRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn CoilRepository>) -> Self {
        Self { repository }
    }
}
