//! Page-to-segment chunking.
//!
//! Each page feeds two independent sub-pipelines:
//!
//! - **text**: blank-line paragraphs, greedily packed up to the size limit, then
//!   any oversized unit sliced by a sliding window;
//! - **tables**: each grid flattened to bullet rows and sliced directly, without
//!   the packing step.
//!
//! Segment ids depend only on `(doc_id, page, kind, ordinal)`, so re-chunking an
//! unchanged document yields the same ids and re-indexing is an idempotent upsert.

pub mod config;
pub mod error;
pub mod split;

#[cfg(test)]
mod tests;

pub use config::{ChunkerConfig, DEFAULT_MAX_SEGMENT_LENGTH, DEFAULT_OVERLAP_LENGTH};
pub use error::ChunkingError;
pub use split::{flatten_table, pack_paragraphs, sliding_window, split_paragraphs};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{NormalizedDocument, NormalizedPage};
use crate::lang::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Text,
    Table,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Text => "text",
            SourceKind::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(SourceKind::Text),
            "table" => Some(SourceKind::Table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Persisted corpus unit. The serialized shape is a stable contract for
/// re-indexing and offline evaluation tools.
pub struct Segment {
    pub id: String,
    pub text: String,
    pub doc_id: String,
    pub page: u32,
    pub language: Language,
    pub source_kind: SourceKind,
}

/// `{doc_id}-p{page}-seg{ordinal}`
pub fn text_segment_id(doc_id: &str, page: u32, ordinal: usize) -> String {
    format!("{doc_id}-p{page}-seg{ordinal}")
}

/// `{doc_id}-p{page}-table{table_ordinal}-seg{ordinal}`
pub fn table_segment_id(doc_id: &str, page: u32, table_ordinal: usize, ordinal: usize) -> String {
    format!("{doc_id}-p{page}-table{table_ordinal}-seg{ordinal}")
}

#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Fails fast on a zero limit or an overlap that would stall the window.
    pub fn new(config: ChunkerConfig) -> Result<Self, ChunkingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    pub fn chunk_document(&self, document: &NormalizedDocument) -> Vec<Segment> {
        let segments: Vec<Segment> = document
            .pages
            .iter()
            .flat_map(|page| self.chunk_page(&document.doc_id, page))
            .collect();

        debug!(
            doc_id = %document.doc_id,
            pages = document.pages.len(),
            segments = segments.len(),
            "Chunked document"
        );

        segments
    }

    /// Text segments first, then table segments in table order.
    pub fn chunk_page(&self, doc_id: &str, page: &NormalizedPage) -> Vec<Segment> {
        let max_len = self.config.max_segment_length;
        let overlap = self.config.overlap_length;

        let make_segment = |id: String, text: String, source_kind: SourceKind| Segment {
            id,
            text,
            doc_id: doc_id.to_string(),
            page: page.page_number,
            language: page.language,
            source_kind,
        };

        let units = pack_paragraphs(split_paragraphs(&page.text), max_len);
        let mut segments: Vec<Segment> = units
            .iter()
            .flat_map(|unit| sliding_window(unit, max_len, overlap))
            .enumerate()
            .map(|(ordinal, text)| {
                make_segment(
                    text_segment_id(doc_id, page.page_number, ordinal),
                    text,
                    SourceKind::Text,
                )
            })
            .collect();

        for (table_ordinal, table) in page.tables.iter().enumerate() {
            let flat = flatten_table(table);
            if flat.trim().is_empty() {
                continue;
            }
            segments.extend(
                sliding_window(&flat, max_len, overlap)
                    .into_iter()
                    .enumerate()
                    .map(|(ordinal, text)| {
                        make_segment(
                            table_segment_id(doc_id, page.page_number, table_ordinal, ordinal),
                            text,
                            SourceKind::Table,
                        )
                    }),
            );
        }

        segments
    }
}
