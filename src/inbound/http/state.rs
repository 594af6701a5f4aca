//! Shared HTTP adapter state.
//!
//! Handlers accept this via `actix_web::web::Data` so they depend on the
//! domain services only and stay testable without real backends.

use std::sync::Arc;

use crate::domain::{CheckService, ZoneService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub zones: Arc<ZoneService>,
    pub checks: Arc<CheckService>,
    /// Trailing window for the stats endpoint, injected from config.
    pub stats_window_mins: i64,
}

impl HttpState {
    pub fn new(zones: Arc<ZoneService>, checks: Arc<CheckService>, stats_window_mins: i64) -> Self {
        Self {
            zones,
            checks,
            stats_window_mins,
        }
    }
}
