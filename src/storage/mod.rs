//! Object storage for raw uploads and normalized outputs.
//!
//! Keys are `/`-separated relative paths. Normalized documents are written as
//! `{doc_id}/normalized.json` plus one `{doc_id}/pages/page-NNN.txt` per page.

pub mod error;
mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;


pub use error::StorageError;
pub use local::LocalObjectStore;
#[cfg(any(test, feature = "mock"))]
pub use mock::MemoryObjectStore;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use tracing::debug;

use crate::document::NormalizedDocument;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
}

pub fn normalized_key(doc_id: &str) -> String {
    format!("{doc_id}/normalized.json")
}

pub fn page_key(doc_id: &str, page_number: u32) -> String {
    format!("{doc_id}/pages/page-{page_number:03}.txt")
}

/// Key for a raw upload, keeping only the final path component of `file_name`.
pub fn raw_key(doc_id: &str, file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("source");
    format!("{doc_id}/{base}")
}

/// Rejects absolute keys and parent-directory components.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if invalid {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Writes the pretty-printed document and its per-page text files.
/// Returns the keys written, document first.
pub async fn write_normalized_outputs(
    store: &dyn ObjectStore,
    document: &NormalizedDocument,
) -> Result<Vec<String>, StorageError> {
    let json = serde_json::to_vec_pretty(document).map_err(|e| StorageError::Serialization {
        reason: e.to_string(),
    })?;

    let doc_key = normalized_key(&document.doc_id);
    store.put(&doc_key, json, CONTENT_TYPE_JSON).await?;

    let page_keys: Vec<String> = document
        .pages
        .iter()
        .map(|page| page_key(&document.doc_id, page.page_number))
        .collect();
    try_join_all(document.pages.iter().zip(&page_keys).map(|(page, key)| {
        store.put(key, page.text.clone().into_bytes(), CONTENT_TYPE_TEXT)
    }))
    .await?;

    let mut keys = Vec::with_capacity(page_keys.len() + 1);
    keys.push(doc_key);
    keys.extend(page_keys);

    debug!(doc_id = %document.doc_id, objects = keys.len(), "Wrote normalized outputs");
    Ok(keys)
}
