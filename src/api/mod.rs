//! HTTP surface of the gateway: shared state, routes, and error mapping.

pub mod error;
pub mod routes;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::models::Config;
use crate::orchestrator::Orchestrator;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<Orchestrator>,
    pub metrics_handle: PrometheusHandle,
}
