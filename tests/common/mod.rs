//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use govdoc::answer::{AskService, StaticAnswerGenerator};
use govdoc::chunking::{Chunker, ChunkerConfig};
use govdoc::document::RawElement;
use govdoc::embedding::{EmbeddingPivot, HashEmbedder};
use govdoc::ingest::{DocumentMetadata, IngestPipeline, IngestRequest};
use govdoc::lang::{FixedLanguage, Language};
use govdoc::normalize::BlockGraphReducer;
use govdoc::rerank::{LexicalReranker, RerankProvider};
use govdoc::retrieval::RetrievalFusion;
use govdoc::retry::RetryPolicy;
use govdoc::storage::MemoryObjectStore;
use govdoc::translate::TaggingTranslator;
use govdoc::vectordb::MockVectorIndex;

pub const DIM: usize = 32;
pub const MAX_SEGMENT: usize = 50;
pub const OVERLAP: usize = 10;

pub const PAGE_ONE_LINE: &str = "Annual report of the Department of Finance.";
pub const PAGE_TWO_LINES: [&str; 2] = [
    "Spending on health programs increased this year.",
    "Education funding remained stable across regions.",
];

/// Two pages: a heading line plus one 2x2 table on page 1, running text on page 2.
pub fn two_page_elements() -> Vec<RawElement> {
    vec![
        RawElement::line("p1-l1", 1, PAGE_ONE_LINE),
        RawElement::table("p1-t1", 1, ["p1-c11", "p1-c12", "p1-c21", "p1-c22"]),
        RawElement::cell("p1-c11", 1, 1, 1, ["p1-w1"]),
        RawElement::cell("p1-c12", 1, 1, 2, ["p1-w2", "p1-w3"]),
        RawElement::cell("p1-c21", 1, 2, 1, ["p1-m1"]),
        RawElement::cell("p1-c22", 1, 2, 2, ["p1-w4"]),
        RawElement::word("p1-w1", 1, "Program"),
        RawElement::word("p1-w2", 1, "Budget"),
        RawElement::word("p1-w3", 1, "2024"),
        RawElement::selection_mark("p1-m1", 1, true),
        RawElement::word("p1-w4", 1, "Approved"),
        RawElement::line("p2-l1", 2, PAGE_TWO_LINES[0]),
        RawElement::line("p2-l2", 2, PAGE_TWO_LINES[1]),
    ]
}

pub fn english_reducer() -> BlockGraphReducer {
    BlockGraphReducer::new(Arc::new(FixedLanguage(Language::English)))
}

pub fn small_chunker() -> Chunker {
    Chunker::new(ChunkerConfig::new(MAX_SEGMENT, OVERLAP)).expect("valid chunker config")
}

pub fn ingest_request(doc_id: &str) -> IngestRequest {
    let mut metadata = DocumentMetadata::for_file("uploads/annual-report.pdf");
    metadata.dept = Some("Finance".to_string());
    IngestRequest::from_elements(
        doc_id,
        format!("{doc_id}/annual-report.pdf"),
        metadata,
        two_page_elements(),
    )
}

/// In-memory collaborators wired the way the server wires the real ones.
pub struct Stack {
    pub store: Arc<MemoryObjectStore>,
    pub index: Arc<MockVectorIndex>,
    pub embedder: Arc<HashEmbedder>,
    pub translator: Arc<TaggingTranslator>,
    pub pipeline: IngestPipeline,
}

impl Stack {
    pub fn new() -> Self {
        let store = Arc::new(MemoryObjectStore::new());
        let index = Arc::new(MockVectorIndex::with_dimension(DIM));
        let embedder = Arc::new(HashEmbedder::new(DIM));
        let translator = Arc::new(TaggingTranslator::new());

        let pipeline = IngestPipeline::new(
            english_reducer(),
            small_chunker(),
            store.clone(),
            EmbeddingPivot::new(translator.clone()),
            embedder.clone(),
            index.clone(),
        )
        .with_retry(RetryPolicy::none());

        Self {
            store,
            index,
            embedder,
            translator,
            pipeline,
        }
    }

    pub fn retrieval(&self, reranker: Arc<dyn RerankProvider>) -> RetrievalFusion {
        RetrievalFusion::new(
            self.embedder.clone(),
            self.index.clone(),
            reranker,
            EmbeddingPivot::new(self.translator.clone()),
        )
        .with_retry(RetryPolicy::none())
        .with_identifier(Arc::new(FixedLanguage(Language::English)))
    }

    pub fn ask_service(&self, answer: &str) -> AskService {
        AskService::new(
            self.retrieval(Arc::new(LexicalReranker::new())),
            Arc::new(StaticAnswerGenerator::new(answer)),
            self.translator.clone(),
        )
    }
}
