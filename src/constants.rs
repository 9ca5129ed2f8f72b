//! Cross-cutting, shared constants.
//!
//! Defaults here are the values used when the matching `GOVDOC_*` environment
//! variable is unset. Module-level configs re-export the ones they own.

/// Maximum characters per persisted segment.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;
/// Characters shared between adjacent sliding windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Final result size when reranking is disabled.
pub const DEFAULT_RETRIEVAL_K: usize = 6;
/// Candidates requested from the vector index when reranking is enabled.
pub const DEFAULT_OVER_FETCH_K: usize = 20;
/// Results kept after reranking.
pub const DEFAULT_RERANK_TOP_N: usize = 6;

/// Cohere accepts 128 texts per call; 96 leaves headroom.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 96;

/// Characters fed to language identification.
pub const LANGUAGE_SAMPLE_CHARS: usize = 4000;

/// OCR job poll interval in seconds.
pub const DEFAULT_OCR_POLL_SECS: u64 = 4;
/// Maximum total OCR wait in seconds.
pub const DEFAULT_OCR_MAX_WAIT_SECS: u64 = 30 * 60;

/// Snippet length kept in vector-index payloads.
pub const PAYLOAD_TEXT_LIMIT: usize = 5000;

pub const DEFAULT_COLLECTION_NAME: &str = "govdoc_segments";
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;
pub const DEFAULT_VECTOR_SIZE_U64: u64 = DEFAULT_EMBEDDING_DIM as u64;

/// Points per vector-index upsert request.
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 64;

/// Largest accepted `POST /upload` body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Cohere REST API root shared by the embed and rerank clients.
pub const DEFAULT_COHERE_BASE_URL: &str = "https://api.cohere.com";
