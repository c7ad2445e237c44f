use std::sync::Arc;

use crate::config::Config;
use crate::export::gate::JobGate;
use crate::export::Exporter;
use crate::layout::CanvasConfig;
use crate::llm_client::Rewriter;
use crate::rate_limit::FixedWindowLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Upstream rewrite service. `LlmClient` in production, stubs in tests.
    pub rewriter: Arc<dyn Rewriter>,
    /// Per-client quota for `/api/optimize`.
    pub limiter: Arc<FixedWindowLimiter>,
    /// One rewrite in flight per client.
    pub optimize_gate: Arc<JobGate>,
    /// One batch export in flight per client.
    pub export_gate: Arc<JobGate>,
    pub exporter: Exporter,
    pub canvas: CanvasConfig,
}
