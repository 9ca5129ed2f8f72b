use std::sync::Arc;

use super::*;
use crate::lang::Language;
use crate::translate::{FailingTranslator, TaggingTranslator};

fn texts(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_embed_batched_preserves_order_across_batches() {
    let embedder = HashEmbedder::new(32).with_batch_size(2);
    let input = texts(&["alpha", "bravo", "charlie", "delta", "echo"]);

    let vectors = embed_batched(&embedder, &input, EmbedMode::Document, &RetryPolicy::none())
        .await
        .unwrap();

    assert_eq!(embedder.batch_sizes(), vec![2, 2, 1]);
    assert_eq!(vectors.len(), input.len());
    for (text, vector) in input.iter().zip(&vectors) {
        assert_eq!(vector, &embedder.embed_text(text));
    }
}

#[tokio::test]
async fn test_embed_batched_retries_transient_failure() {
    let embedder = HashEmbedder::new(16).with_batch_size(10).fail_next(2);
    let input = texts(&["one", "two"]);

    let vectors = embed_batched(&embedder, &input, EmbedMode::Query, &RetryPolicy::immediate(3))
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(embedder.batch_sizes(), vec![2]);
}

#[tokio::test]
async fn test_embed_batched_surfaces_exhausted_retries() {
    let embedder = HashEmbedder::new(16).fail_next(5);
    let err = embed_batched(
        &embedder,
        &texts(&["one"]),
        EmbedMode::Query,
        &RetryPolicy::immediate(2),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EmbeddingError::Unavailable { .. }));
}

#[tokio::test]
async fn test_embed_batched_rejects_zero_batch_size() {
    let embedder = HashEmbedder::new(16).with_batch_size(0);
    let err = embed_batched(&embedder, &texts(&["x"]), EmbedMode::Query, &RetryPolicy::none())
        .await
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_embed_query_returns_single_vector() {
    let embedder = HashEmbedder::new(8);
    let vector = embed_query(&embedder, "budget", &RetryPolicy::none())
        .await
        .unwrap();
    assert_eq!(vector.len(), 8);
}

#[test]
fn test_hash_embedder_is_normalized_and_deterministic() {
    let embedder = HashEmbedder::new(64);
    let a = embedder.embed_text("Road maintenance budget");
    let b = embedder.embed_text("road MAINTENANCE budget");
    assert_eq!(a, b);

    let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);

    assert!(embedder.embed_text("").iter().all(|v| *v == 0.0));
}

#[test]
fn test_embed_mode_input_type() {
    assert_eq!(EmbedMode::Query.input_type(), "search_query");
    assert_eq!(EmbedMode::Document.input_type(), "search_document");
}

#[test]
fn test_model_capability_parse() {
    assert_eq!(
        ModelCapability::parse("Monolingual"),
        Some(ModelCapability::Monolingual)
    );
    assert_eq!(
        ModelCapability::parse("multilingual"),
        Some(ModelCapability::Multilingual)
    );
    assert_eq!(ModelCapability::parse("bilingual"), None);
}

#[tokio::test]
async fn test_pivot_monolingual_translates_french() {
    let translator = Arc::new(TaggingTranslator::new());
    let pivot = EmbeddingPivot::new(translator.clone());
    let input = texts(&["Budget des routes", "Road budget"]);

    let out = pivot
        .prepare(
            &input,
            &[Language::French, Language::English],
            ModelCapability::Monolingual,
        )
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_ne!(out[0], input[0]);
    assert_eq!(out[0], "[fr->en] Budget des routes");
    assert_eq!(out[1], input[1]);
    assert_eq!(translator.calls(), 1);
}

#[tokio::test]
async fn test_pivot_multilingual_is_identity() {
    let translator = Arc::new(TaggingTranslator::new());
    let pivot = EmbeddingPivot::new(translator.clone());
    let input = texts(&["Budget des routes"]);

    let out = pivot
        .prepare(&input, &[Language::French], ModelCapability::Multilingual)
        .await
        .unwrap();

    assert_eq!(out, input);
    assert_eq!(translator.calls(), 0);
}

#[tokio::test]
async fn test_pivot_rejects_length_mismatch() {
    let pivot = EmbeddingPivot::new(Arc::new(TaggingTranslator::new()));
    let err = pivot
        .prepare(&texts(&["a", "b"]), &[Language::English], ModelCapability::Monolingual)
        .await
        .unwrap_err();
    assert!(matches!(err, PivotError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_pivot_propagates_translation_failure() {
    let pivot = EmbeddingPivot::new(Arc::new(FailingTranslator));
    let err = pivot
        .prepare_one("Bonjour", Language::French, ModelCapability::Monolingual)
        .await
        .unwrap_err();
    assert!(matches!(err, PivotError::Translation(_)));

    // Default-language text never reaches the translator.
    let out = pivot
        .prepare_one("Hello", Language::English, ModelCapability::Monolingual)
        .await
        .unwrap();
    assert_eq!(out, "Hello");
}
