//! Document ingestion: OCR → normalize → store → chunk → pivot → embed → upsert.
//!
//! Every step after OCR is deterministic for a given block graph, and point
//! ids derive from segment ids, so re-ingesting a document overwrites its
//! points instead of duplicating them.

pub mod error;


pub use error::{IngestError, IngestStage, StageError};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::chunking::{Chunker, Segment};
use crate::constants::DEFAULT_UPSERT_BATCH_SIZE;
use crate::document::{NormalizedDocument, RawElement};
use crate::embedding::{EmbedMode, EmbeddingPivot, EmbeddingProvider, ModelCapability, embed_batched};
use crate::hashing::content_digest;
use crate::normalize::{BlockGraphReducer, element_histogram};
use crate::ocr::{DEFAULT_FEATURES, OcrEngine, OcrFeature, PollConfig, run_job};
use crate::retry::RetryPolicy;
use crate::storage::{ObjectStore, normalized_key, raw_key, validate_key, write_normalized_outputs};
use crate::vectordb::{IndexPoint, VectorIndex};

/// Descriptive metadata stored with the normalized document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub dept: Option<String>,
    pub date: Option<String>,
    /// Pins every page's language instead of detecting it.
    pub language: Option<String>,
}

impl DocumentMetadata {
    /// Title defaults to the file's base name.
    pub fn for_file(file_name: &str) -> Self {
        let title = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name)
            .to_string();
        Self {
            title,
            ..Self::default()
        }
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("title".to_string(), self.title);
        if let Some(dept) = self.dept {
            map.insert("dept".to_string(), dept);
        }
        if let Some(date) = self.date {
            map.insert("date".to_string(), date);
        }
        if let Some(language) = self.language {
            map.insert(crate::normalize::LANGUAGE_METADATA_KEY.to_string(), language);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestSource {
    /// Block graph already extracted elsewhere.
    Elements(Vec<RawElement>),
    /// Run the configured OCR engine on the source locator.
    Ocr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestRequest {
    pub doc_id: String,
    pub source_locator: String,
    pub metadata: DocumentMetadata,
    pub source: IngestSource,
}

impl IngestRequest {
    pub fn from_elements(
        doc_id: impl Into<String>,
        source_locator: impl Into<String>,
        metadata: DocumentMetadata,
        elements: Vec<RawElement>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            source_locator: source_locator.into(),
            metadata,
            source: IngestSource::Elements(elements),
        }
    }

    pub fn ocr(
        doc_id: impl Into<String>,
        source_locator: impl Into<String>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            source_locator: source_locator.into(),
            metadata,
            source: IngestSource::Ocr,
        }
    }
}

/// Random document id for uploads that do not name one.
pub fn new_doc_id() -> String {
    Uuid::new_v4().to_string()
}

/// A doc id must be a single valid storage key component.
pub fn validate_doc_id(doc_id: &str) -> Result<(), IngestError> {
    if doc_id.trim().is_empty() || doc_id.contains('/') || validate_key(doc_id).is_err() {
        return Err(IngestError::InvalidRequest {
            reason: format!("doc_id '{doc_id}' must be a single non-empty path component"),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub segments: usize,
    pub points_upserted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub doc_id: String,
    pub ocr_job_id: Option<String>,
    pub pages: usize,
    pub stored_keys: Vec<String>,
    /// BLAKE3 of the concatenated page texts; changes whenever extracted text does.
    pub text_digest: String,
    /// Unix seconds.
    pub ingested_at: i64,
    #[serde(flatten)]
    pub index: IndexSummary,
}

#[derive(Clone)]
pub struct IngestPipeline {
    reducer: BlockGraphReducer,
    chunker: Chunker,
    store: Arc<dyn ObjectStore>,
    pivot: EmbeddingPivot,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    ocr: Option<Arc<dyn OcrEngine>>,
    ocr_features: Vec<OcrFeature>,
    poll: PollConfig,
    capability: ModelCapability,
    retry: RetryPolicy,
    upsert_batch_size: usize,
}

impl std::fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestPipeline")
            .field("chunker", &self.chunker)
            .field("ocr", &self.ocr.is_some())
            .field("capability", &self.capability)
            .field("upsert_batch_size", &self.upsert_batch_size)
            .finish_non_exhaustive()
    }
}

impl IngestPipeline {
    pub fn new(
        reducer: BlockGraphReducer,
        chunker: Chunker,
        store: Arc<dyn ObjectStore>,
        pivot: EmbeddingPivot,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            reducer,
            chunker,
            store,
            pivot,
            embedder,
            index,
            ocr: None,
            ocr_features: DEFAULT_FEATURES.to_vec(),
            poll: PollConfig::default(),
            capability: ModelCapability::default(),
            retry: RetryPolicy::default(),
            upsert_batch_size: DEFAULT_UPSERT_BATCH_SIZE,
        }
    }

    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>, poll: PollConfig) -> Self {
        self.ocr = Some(engine);
        self.poll = poll;
        self
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn with_capability(mut self, capability: ModelCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Zero is treated as one.
    pub fn with_upsert_batch_size(mut self, size: usize) -> Self {
        self.upsert_batch_size = size.max(1);
        self
    }

    /// Stores raw bytes under `{doc_id}/{basename}` and returns the key.
    pub async fn upload(
        &self,
        doc_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, IngestError> {
        validate_doc_id(doc_id)?;
        let key = raw_key(doc_id, file_name);
        self.store
            .put(&key, bytes, content_type)
            .await
            .map_err(|e| IngestError::stage(doc_id, IngestStage::Upload, e))?;
        info!(doc_id = doc_id, key = %key, "Uploaded raw document");
        Ok(key)
    }

    #[instrument(skip(self, request), fields(doc_id = %request.doc_id))]
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReport, IngestError> {
        let IngestRequest {
            doc_id,
            source_locator,
            metadata,
            source,
        } = request;

        validate_doc_id(&doc_id)?;

        let (elements, ocr_job_id) = match source {
            IngestSource::Elements(elements) => (elements, None),
            IngestSource::Ocr => {
                let engine = self
                    .ocr
                    .as_ref()
                    .ok_or_else(|| IngestError::OcrUnavailable {
                        doc_id: doc_id.clone(),
                    })?;
                let (job_id, elements) =
                    run_job(engine.as_ref(), &source_locator, &self.ocr_features, &self.poll)
                        .await
                        .map_err(|e| IngestError::stage(&doc_id, IngestStage::Ocr, e))?;
                (elements, Some(job_id))
            }
        };

        debug!(histogram = ?element_histogram(&elements), "Block graph received");

        let document =
            self.reducer
                .normalize_document(&doc_id, &source_locator, metadata.into_map(), &elements);

        let stored_keys = write_normalized_outputs(self.store.as_ref(), &document)
            .await
            .map_err(|e| IngestError::stage(&doc_id, IngestStage::Store, e))?;

        let index = self.index_document(&document).await?;

        let text_digest = content_digest(
            document
                .pages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
                .as_bytes(),
        );

        info!(
            pages = document.pages.len(),
            segments = index.segments,
            points = index.points_upserted,
            "Document ingested"
        );

        Ok(IngestReport {
            doc_id,
            ocr_job_id,
            pages: document.pages.len(),
            stored_keys,
            text_digest,
            ingested_at: chrono::Utc::now().timestamp(),
            index,
        })
    }

    /// Rebuilds the index entries of a stored document from its `normalized.json`.
    #[instrument(skip(self))]
    pub async fn reindex(&self, doc_id: &str) -> Result<IndexSummary, IngestError> {
        let bytes = self
            .store
            .get(&normalized_key(doc_id))
            .await
            .map_err(|e| IngestError::stage(doc_id, IngestStage::Load, e))?;

        let document: NormalizedDocument = serde_json::from_slice(&bytes).map_err(|e| {
            IngestError::stage(
                doc_id,
                IngestStage::Load,
                StageError::Malformed {
                    reason: e.to_string(),
                },
            )
        })?;

        self.index_document(&document).await
    }

    /// Chunks, embeds and upserts a normalized document.
    pub async fn index_document(
        &self,
        document: &NormalizedDocument,
    ) -> Result<IndexSummary, IngestError> {
        let doc_id = document.doc_id.as_str();
        let segments = self.chunker.chunk_document(document);
        if segments.is_empty() {
            debug!(doc_id = doc_id, "No segments to index");
            return Ok(IndexSummary {
                segments: 0,
                points_upserted: 0,
            });
        }

        let vectors = self.embed_segments(doc_id, &segments).await?;

        let points: Vec<IndexPoint> = segments
            .iter()
            .zip(vectors)
            .map(|(segment, vector)| {
                IndexPoint::from_segment(segment, vector, Some(&document.source_locator))
            })
            .collect();

        let mut upserted = 0usize;
        for batch in points.chunks(self.upsert_batch_size) {
            self.index
                .upsert(batch.to_vec())
                .await
                .map_err(|e| IngestError::stage(doc_id, IngestStage::Index, e))?;
            upserted += batch.len();
        }

        Ok(IndexSummary {
            segments: segments.len(),
            points_upserted: upserted,
        })
    }

    async fn embed_segments(
        &self,
        doc_id: &str,
        segments: &[Segment],
    ) -> Result<Vec<Vec<f32>>, IngestError> {
        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let languages: Vec<_> = segments.iter().map(|s| s.language).collect();

        let prepared = self
            .pivot
            .prepare(&texts, &languages, self.capability)
            .await
            .map_err(|e| IngestError::stage(doc_id, IngestStage::Pivot, e))?;

        embed_batched(
            self.embedder.as_ref(),
            &prepared,
            EmbedMode::Document,
            &self.retry,
        )
        .await
        .map_err(|e| IngestError::stage(doc_id, IngestStage::Embed, e))
    }
}
