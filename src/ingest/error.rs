use std::fmt;

use thiserror::Error;

use crate::embedding::{EmbeddingError, PivotError};
use crate::ocr::OcrError;
use crate::storage::StorageError;
use crate::vectordb::VectorDbError;

/// Pipeline step at which ingestion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Upload,
    Ocr,
    Store,
    Load,
    Pivot,
    Embed,
    Index,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Upload => "upload",
            IngestStage::Ocr => "ocr",
            IngestStage::Store => "store",
            IngestStage::Load => "load",
            IngestStage::Pivot => "pivot",
            IngestStage::Embed => "embed",
            IngestStage::Index => "index",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pivot(#[from] PivotError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    #[error("malformed normalized document: {reason}")]
    Malformed { reason: String },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid ingest request: {reason}")]
    InvalidRequest { reason: String },

    #[error("document {doc_id} requires OCR but no OCR engine is configured")]
    OcrUnavailable { doc_id: String },

    #[error("ingestion of {doc_id} failed at {stage}: {source}")]
    Stage {
        doc_id: String,
        stage: IngestStage,
        #[source]
        source: StageError,
    },
}

impl IngestError {
    pub(crate) fn stage(doc_id: &str, stage: IngestStage, source: impl Into<StageError>) -> Self {
        IngestError::Stage {
            doc_id: doc_id.to_string(),
            stage,
            source: source.into(),
        }
    }

    pub fn failed_stage(&self) -> Option<IngestStage> {
        match self {
            IngestError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
