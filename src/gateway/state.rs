use std::sync::Arc;

use crate::answer::AskService;
use crate::ingest::IngestPipeline;

/// Shared handler state. Clients inside are built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub ask: Arc<AskService>,

    /// `None` disables `POST /ingest`.
    pub ingest: Option<Arc<IngestPipeline>>,
}

impl AppState {
    pub fn new(ask: AskService) -> Self {
        Self {
            ask: Arc::new(ask),
            ingest: None,
        }
    }

    pub fn with_ingest(mut self, pipeline: IngestPipeline) -> Self {
        self.ingest = Some(Arc::new(pipeline));
        self
    }
}
