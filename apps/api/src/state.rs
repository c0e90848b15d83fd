use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelInvoker;
use crate::store::InterviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Interview and response records. Default: `PgInterviewStore`.
    pub store: Arc<dyn InterviewStore>,
    /// Constructed once at startup. Default: `GeminiClient`.
    pub model: Arc<dyn ModelInvoker>,
    pub config: Config,
}
