//! Application state for the HTTP server.

use std::sync::Arc;

use crate::analytics::AggregationPolicy;
use crate::db::repository::PrayerLogRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn PrayerLogRepository>,
    /// Aggregation policy applied to analytics queries
    pub policy: Arc<AggregationPolicy>,
}

impl AppState {
    /// Create a new application state with the given repository and policy.
    pub fn new(repository: Arc<dyn PrayerLogRepository>, policy: AggregationPolicy) -> Self {
        Self {
            repository,
            policy: Arc::new(policy),
        }
    }
}
