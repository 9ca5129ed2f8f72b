use std::sync::Arc;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::*;
use crate::answer::{AskService, StaticAnswerGenerator};
use crate::chunking::{Chunker, ChunkerConfig};
use crate::embedding::{EmbeddingPivot, HashEmbedder};
use crate::ingest::IngestPipeline;
use crate::lang::{FixedLanguage, Language};
use crate::normalize::BlockGraphReducer;
use crate::rerank::LexicalReranker;
use crate::retrieval::RetrievalFusion;
use crate::retry::RetryPolicy;
use crate::storage::MemoryObjectStore;
use crate::translate::TaggingTranslator;
use crate::vectordb::MockVectorIndex;

const DIM: usize = 32;

fn build_state(index: Arc<MockVectorIndex>) -> AppState {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let pivot = EmbeddingPivot::new(Arc::new(TaggingTranslator::new()));
    let identifier = Arc::new(FixedLanguage(Language::English));

    let retrieval = RetrievalFusion::new(
        embedder.clone(),
        index.clone(),
        Arc::new(LexicalReranker::new()),
        pivot.clone(),
    )
    .with_retry(RetryPolicy::none())
    .with_identifier(identifier.clone());

    let ask = AskService::new(
        retrieval,
        Arc::new(StaticAnswerGenerator::new("See [doc:1].")),
        Arc::new(TaggingTranslator::new()),
    );

    let ingest = IngestPipeline::new(
        BlockGraphReducer::new(identifier),
        Chunker::new(ChunkerConfig::default()).expect("chunker"),
        Arc::new(MemoryObjectStore::new()),
        pivot,
        embedder,
        index,
    )
    .with_retry(RetryPolicy::none());

    AppState::new(ask).with_ingest(ingest)
}

fn router() -> (Router, Arc<MockVectorIndex>) {
    let index = Arc::new(MockVectorIndex::with_dimension(DIM));
    (create_router_with_state(build_state(index.clone())), index)
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let (app, _) = router();

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(GOVDOC_STATUS_HEADER).unwrap(),
        GOVDOC_STATUS_OK
    );
    assert!(response.headers().contains_key("strict-transport-security"));
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_ask_empty_query_is_bad_request() {
    let (app, _) = router();

    let response = app
        .oneshot(json_request("/ask", serde_json::json!({"query": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(GOVDOC_STATUS_HEADER).unwrap(),
        GOVDOC_STATUS_ERROR
    );
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_ask_schema_error_is_bad_request() {
    let (app, _) = router();

    let response = app
        .oneshot(json_request("/ask", serde_json::json!({"question": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_with_failing_index_returns_empty_answer() {
    let (app, index) = router();
    index.set_fail_queries(true);

    let response = app
        .oneshot(json_request("/ask", serde_json::json!({"query": "budget"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], "");
    assert_eq!(body["citations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_ingest_then_ask() {
    let (app, _) = router();

    let ingest = json_request(
        "/ingest",
        serde_json::json!({
            "doc_id": "doc",
            "source_locator": "doc/report.pdf",
            "dept": "Finance",
            "elements": [
                {"id": "l1", "kind": "line", "page": 1, "text": "Budget totals for health programs."}
            ]
        }),
    );
    let response = app.clone().oneshot(ingest).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["doc_id"], "doc");
    assert_eq!(report["segments"], 1);

    let response = app
        .oneshot(json_request(
            "/ask",
            serde_json::json!({"query": "health budget", "k": 3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], "See [doc:1].");
    assert_eq!(body["citations"][0]["doc_id"], "doc");
    assert_eq!(body["citations"][0]["page"], 1);
}

#[tokio::test]
async fn test_ingest_without_elements_needs_ocr() {
    let (app, _) = router();

    let response = app
        .oneshot(json_request(
            "/ingest",
            serde_json::json!({"source_locator": "doc/report.pdf"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ingest_disabled() {
    let index = Arc::new(MockVectorIndex::with_dimension(DIM));
    let mut state = build_state(index);
    state.ingest = None;
    let app = create_router_with_state(state);

    let response = app
        .oneshot(json_request(
            "/ingest",
            serde_json::json!({"source_locator": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
