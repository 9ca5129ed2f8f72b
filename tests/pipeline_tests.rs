//! Normalize, chunk, ingest and retrieve against in-memory collaborators.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use govdoc::chunking::SourceKind;
use govdoc::hashing::segment_point_id;
use govdoc::rerank::{FailingReranker, ScriptedReranker};
use govdoc::retrieval::RetrievalParams;
use govdoc::scoring::{self, CitationSet, EvalExample, RerankScoreDistribution};
use govdoc::storage::{normalized_key, page_key};

use common::{MAX_SEGMENT, OVERLAP, PAGE_ONE_LINE, Stack};

#[test]
fn test_two_page_document_segments() {
    let document = common::english_reducer().normalize_document(
        "doc",
        "doc/annual-report.pdf",
        BTreeMap::new(),
        &common::two_page_elements(),
    );

    assert_eq!(document.pages.len(), 2);
    assert_eq!(document.pages[0].tables.len(), 1);
    assert!(document.pages[1].tables.is_empty());

    let segments = common::small_chunker().chunk_document(&document);
    let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "doc-p1-seg0",
            "doc-p1-table0-seg0",
            "doc-p2-seg0",
            "doc-p2-seg1",
            "doc-p2-seg2",
        ]
    );

    let tables: Vec<_> = segments
        .iter()
        .filter(|s| s.source_kind == SourceKind::Table)
        .collect();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].id, "doc-p1-table0-seg0");
    assert_eq!(tables[0].text, "- Program | Budget 2024\n- [X] | Approved");

    for segment in &segments {
        assert!(
            segment.text.chars().count() <= MAX_SEGMENT,
            "{} is {} chars",
            segment.id,
            segment.text.chars().count()
        );
    }

    assert_eq!(segments[0].text, PAGE_ONE_LINE);
}

#[test]
fn test_sliding_windows_share_overlap() {
    let document = common::english_reducer().normalize_document(
        "doc",
        "doc/annual-report.pdf",
        BTreeMap::new(),
        &common::two_page_elements(),
    );
    let segments = common::small_chunker().chunk_page("doc", &document.pages[1]);
    assert_eq!(segments.len(), 3);

    for pair in segments.windows(2) {
        let left: Vec<char> = pair[0].text.chars().collect();
        let right: Vec<char> = pair[1].text.chars().collect();
        assert_eq!(left.len(), MAX_SEGMENT);
        assert_eq!(&left[left.len() - OVERLAP..], &right[..OVERLAP]);
    }

    assert!(segments[2].text.chars().count() < MAX_SEGMENT);
}

#[test]
fn test_segment_ids_are_stable_across_runs() {
    let run = || {
        let document = common::english_reducer().normalize_document(
            "doc",
            "doc/annual-report.pdf",
            BTreeMap::new(),
            &common::two_page_elements(),
        );
        common::small_chunker()
            .chunk_document(&document)
            .into_iter()
            .map(|s| (s.id, s.text))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[tokio::test]
async fn test_ingest_stores_outputs_and_indexes_segments() {
    let stack = Stack::new();

    let report = stack
        .pipeline
        .ingest(common::ingest_request("doc"))
        .await
        .expect("ingest");

    assert_eq!(report.doc_id, "doc");
    assert_eq!(report.pages, 2);
    assert_eq!(report.index.segments, 5);
    assert_eq!(report.index.points_upserted, 5);
    assert_eq!(
        report.stored_keys,
        vec![normalized_key("doc"), page_key("doc", 1), page_key("doc", 2)]
    );

    assert!(stack.store.keys().contains(&"doc/normalized.json".to_string()));
    assert!(stack.store.keys().contains(&"doc/pages/page-002.txt".to_string()));

    let point = stack.index.get("doc-p1-table0-seg0").expect("table point");
    assert_eq!(point.metadata.doc_id, "doc");
    assert_eq!(point.metadata.page, 1);
    assert_eq!(point.metadata.source_kind, SourceKind::Table);
    assert_eq!(
        point.metadata.source_locator.as_deref(),
        Some("doc/annual-report.pdf")
    );
}

#[tokio::test]
async fn test_reingest_is_idempotent() {
    let stack = Stack::new();

    let first = stack
        .pipeline
        .ingest(common::ingest_request("doc"))
        .await
        .unwrap();
    let second = stack
        .pipeline
        .ingest(common::ingest_request("doc"))
        .await
        .unwrap();

    assert_eq!(first.text_digest, second.text_digest);
    assert_eq!(stack.index.point_count(), 5);
    assert_ne!(
        segment_point_id("doc-p2-seg0"),
        segment_point_id("doc-p2-seg1")
    );
}

#[tokio::test]
async fn test_reindex_from_stored_document() {
    let stack = Stack::new();
    stack
        .pipeline
        .ingest(common::ingest_request("doc"))
        .await
        .unwrap();

    let summary = stack.pipeline.reindex("doc").await.expect("reindex");
    assert_eq!(summary.segments, 5);
    assert_eq!(stack.index.point_count(), 5);
}

#[tokio::test]
async fn test_retrieval_falls_back_when_reranker_fails() {
    let stack = Stack::new();
    stack
        .pipeline
        .ingest(common::ingest_request("doc"))
        .await
        .unwrap();

    let reranker = Arc::new(FailingReranker::new());
    let retrieval = stack.retrieval(reranker.clone());
    let params = RetrievalParams {
        k: 3,
        rerank_enabled: true,
        over_fetch_k: 20,
        rerank_top_n: 3,
    };

    let results = retrieval
        .retrieve("health programs spending", &params)
        .await
        .expect("retrieve");

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.rerank_score.is_none()));
    assert_eq!(reranker.calls(), 1);

    let distribution =
        scoring::rerank_score_distribution([results.iter().map(|r| r.rerank_score)]);
    assert_eq!(distribution, RerankScoreDistribution::NoScores);
}

#[tokio::test]
async fn test_retrieved_citations_score_against_gold() {
    let stack = Stack::new();
    stack
        .pipeline
        .ingest(common::ingest_request("doc"))
        .await
        .unwrap();

    let retrieval = stack.retrieval(Arc::new(ScriptedReranker::reversing(5)));
    let params = RetrievalParams {
        k: 5,
        rerank_enabled: true,
        over_fetch_k: 20,
        rerank_top_n: 5,
    };

    let results = retrieval
        .retrieve("education funding", &params)
        .await
        .unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.rerank_score.is_some()));

    let returned = CitationSet::from_returned(
        results
            .iter()
            .map(|r| (r.metadata().doc_id.clone(), r.metadata().page)),
    );
    let expected = CitationSet::parse("doc:2").unwrap();

    let metrics = scoring::aggregate(&[
        EvalExample::new(expected, returned),
        EvalExample::default(),
    ]);

    assert_eq!(metrics.examples_scored, 1);
    assert!((metrics.precision - 0.5).abs() < 1e-9);
    assert!((metrics.recall - 1.0).abs() < 1e-9);

    let stats = scoring::rerank_score_distribution([results.iter().map(|r| r.rerank_score)]);
    assert_eq!(stats.stats().map(|s| s.count), Some(5));
}
