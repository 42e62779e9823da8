use std::sync::Arc;

use lq_domain::config::Config;
use lq_providers::{EndpointDiscovery, LocalStubResponder, TieredInferenceClient};
use lq_snapshot::SnapshotStore;

/// Shared application state passed to handlers and CLI commands.
///
/// Every service is built once in [`crate::bootstrap`] and shared by `Arc`;
/// the snapshot store and the discovery cache are the only mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub snapshots: Arc<SnapshotStore>,
    pub discovery: Arc<EndpointDiscovery>,
    pub stub: Arc<LocalStubResponder>,
    pub client: Arc<TieredInferenceClient>,
}
