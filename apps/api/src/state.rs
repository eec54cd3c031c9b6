use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::render::ReportRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model provider. `LlmClient` in production, a scripted provider in tests.
    pub provider: Arc<dyn CompletionProvider>,
    /// Background PDF report jobs.
    pub renderer: ReportRenderer,
    pub config: Config,
}
