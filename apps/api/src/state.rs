use std::sync::Arc;

use crate::config::Config;
use crate::interview::flow::FlowController;
use crate::interview::sessions::SessionRegistry;
use crate::storage::CandidateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub flow: Arc<FlowController>,
    /// Live screening sessions, keyed by session id.
    pub sessions: SessionRegistry,
    pub store: Arc<CandidateStore>,
}
