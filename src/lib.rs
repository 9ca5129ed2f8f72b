//! govdoc library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Document pipeline
//! - [`BlockGraphReducer`] - OCR elements to [`NormalizedDocument`]
//! - [`Chunker`], [`ChunkerConfig`] - Normalized pages to [`Segment`]s
//! - [`EmbeddingPivot`] - Decides which texts need translation before embedding
//! - [`IngestPipeline`] - OCR, normalize, store, chunk, embed, upsert
//!
//! ## Question answering
//! - [`RetrievalFusion`], [`RetrievalParams`] - Vector search with rerank fallback
//! - [`AskService`] - Retrieval, prompt, completion, back-translation
//! - [`create_router_with_state`] - Axum gateway
//!
//! ## Evaluation
//! - [`scoring`] - Citation precision/recall and rerank score statistics
//! - [`EvalRunner`] - Golden-set runs with optional baseline comparison
//!
//! ## Collaborator traits
//! [`OcrEngine`], [`ObjectStore`], [`LanguageIdentifier`], [`Translator`],
//! [`EmbeddingProvider`], [`VectorIndex`], [`RerankProvider`],
//! [`AnswerGenerator`].
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod constants;
pub mod document;
pub mod embedding;
pub mod eval;
pub mod gateway;
pub mod hashing;
pub mod ingest;
pub mod lang;
pub mod normalize;
pub mod ocr;
pub mod rerank;
pub mod retrieval;
pub mod retry;
pub mod scoring;
pub mod storage;
pub mod translate;
pub mod vectordb;

pub use answer::{
    AnswerCitation, AnswerError, AnswerGenerator, AskRequest, AskResponse, AskService,
    GenaiAnswerGenerator,
};
pub use chunking::{Chunker, ChunkerConfig, ChunkingError, Segment, SourceKind};
pub use config::{Config, ConfigError, RerankBackend};
pub use document::{ElementKind, NormalizedDocument, NormalizedPage, RawElement, TableGrid};
pub use embedding::{
    CohereEmbedder, CohereEmbedderConfig, EmbedMode, EmbeddingError, EmbeddingPivot,
    EmbeddingProvider, ModelCapability, PivotError,
};
pub use eval::{EvalError, EvalReport, EvalRunner, GoldenExample};
pub use gateway::{AppState, GatewayError, create_router_with_state};
pub use hashing::{content_digest, hash_to_u64, segment_point_id};
pub use ingest::{IngestError, IngestPipeline, IngestReport, IngestRequest, IngestStage};
pub use lang::{Language, LanguageIdentifier, WhatlangIdentifier};
pub use normalize::BlockGraphReducer;
pub use ocr::{HttpOcrEngine, OcrEngine, OcrError, OcrJobStatus, OcrPoll, PollConfig};
pub use rerank::{CohereReranker, LexicalReranker, RerankProvider, RerankerError};
pub use retrieval::{RerankedMatch, RetrievalError, RetrievalFusion, RetrievalParams};
pub use retry::RetryPolicy;
pub use scoring::ScoringError;
pub use storage::{LocalObjectStore, ObjectStore, StorageError};
pub use translate::{HttpTranslator, IdentityTranslator, TranslateError, Translator};
pub use vectordb::{LazyQdrantIndex, QdrantIndexConfig, VectorDbError, VectorIndex};

#[cfg(any(test, feature = "mock"))]
pub use answer::StaticAnswerGenerator;
#[cfg(any(test, feature = "mock"))]
pub use embedding::HashEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use ocr::ScriptedOcrEngine;
#[cfg(any(test, feature = "mock"))]
pub use storage::MemoryObjectStore;
#[cfg(any(test, feature = "mock"))]
pub use translate::TaggingTranslator;
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorIndex;
