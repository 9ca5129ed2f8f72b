//! Block-graph reduction: flat OCR elements to normalized pages.
//!
//! The reducer is a pure function over already-fetched elements. OCR output is
//! noisy, so dangling references, cell-less tables and pages without lines are
//! tolerated rather than reported.

pub mod table;


pub use table::{ElementIndex, SELECTED_MARK, cell_text, reconstruct_table};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::document::{ElementKind, LineRecord, NormalizedDocument, NormalizedPage, RawElement};
use crate::lang::{Language, LanguageIdentifier, WhatlangIdentifier};

/// Metadata key that pins the document language instead of detecting it.
pub const LANGUAGE_METADATA_KEY: &str = "language";

/// Converts OCR block graphs into [`NormalizedPage`]s.
#[derive(Clone)]
pub struct BlockGraphReducer {
    identifier: Arc<dyn LanguageIdentifier>,
}

impl std::fmt::Debug for BlockGraphReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockGraphReducer").finish_non_exhaustive()
    }
}

impl Default for BlockGraphReducer {
    fn default() -> Self {
        Self::new(Arc::new(WhatlangIdentifier))
    }
}

impl BlockGraphReducer {
    pub fn new(identifier: Arc<dyn LanguageIdentifier>) -> Self {
        Self { identifier }
    }

    /// Reduces elements to pages ordered by page number, detecting each page's language.
    pub fn reduce(&self, elements: &[RawElement]) -> Vec<NormalizedPage> {
        self.reduce_with_language(elements, None)
    }

    /// Like [`reduce`](Self::reduce); an explicit `language` skips detection.
    pub fn reduce_with_language(
        &self,
        elements: &[RawElement],
        language: Option<Language>,
    ) -> Vec<NormalizedPage> {
        let index = ElementIndex::new(elements);

        let mut by_page: BTreeMap<u32, Vec<&RawElement>> = BTreeMap::new();
        for element in elements {
            by_page.entry(element.page).or_default().push(element);
        }

        by_page
            .into_iter()
            .map(|(page_number, page_elements)| {
                self.reduce_page(page_number, &page_elements, &index, language)
            })
            .collect()
    }

    /// Builds a full document. A `language` metadata entry pins every page's language.
    pub fn normalize_document(
        &self,
        doc_id: &str,
        source_locator: &str,
        metadata: BTreeMap<String, String>,
        elements: &[RawElement],
    ) -> NormalizedDocument {
        let language = metadata
            .get(LANGUAGE_METADATA_KEY)
            .filter(|code| !code.trim().is_empty())
            .map(|code| Language::from_code(code));

        let pages = self.reduce_with_language(elements, language);

        debug!(
            doc_id = doc_id,
            elements = elements.len(),
            pages = pages.len(),
            "Normalized document"
        );

        NormalizedDocument {
            doc_id: doc_id.to_string(),
            source_locator: source_locator.to_string(),
            metadata,
            pages,
        }
    }

    fn reduce_page(
        &self,
        page_number: u32,
        elements: &[&RawElement],
        index: &ElementIndex<'_>,
        language: Option<Language>,
    ) -> NormalizedPage {
        let lines: Vec<LineRecord> = elements
            .iter()
            .filter(|e| e.kind == ElementKind::Line)
            .filter_map(|e| {
                let text = e.text.as_deref().filter(|t| !t.is_empty())?;
                Some(LineRecord {
                    text: text.to_string(),
                    bounding_box: e.bounding_box,
                })
            })
            .collect();

        let text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let tables = elements
            .iter()
            .filter(|e| e.kind == ElementKind::Table)
            .filter_map(|table| reconstruct_table(table, index))
            .collect();

        let language = language.unwrap_or_else(|| self.identifier.detect(&text));

        NormalizedPage {
            page_number,
            language,
            text,
            lines,
            tables,
        }
    }
}

/// Counts elements per kind; handy for ingestion logs.
pub fn element_histogram(elements: &[RawElement]) -> HashMap<ElementKind, usize> {
    let mut histogram = HashMap::new();
    for element in elements {
        *histogram.entry(element.kind).or_insert(0) += 1;
    }
    histogram
}
