use std::sync::Arc;

use super::*;
use crate::chunking::SourceKind;
use crate::embedding::{EmbeddingPivot, HashEmbedder};
use crate::lang::LanguageIdentifier;
use crate::rerank::{FailingReranker, LexicalReranker, RerankProvider};
use crate::retry::RetryPolicy;
use crate::translate::{FailingTranslator, TaggingTranslator};
use crate::vectordb::{IndexPoint, Match, MatchMetadata, MockVectorIndex, VectorIndex};

const DIM: usize = 64;

/// Text starting with "fr:" is French; everything else is English.
struct PrefixIdentifier;

impl LanguageIdentifier for PrefixIdentifier {
    fn detect(&self, text: &str) -> Language {
        if text.starts_with("fr:") {
            Language::French
        } else {
            Language::English
        }
    }
}

fn metadata(doc_id: &str, page: u32, text: &str) -> MatchMetadata {
    MatchMetadata {
        doc_id: doc_id.to_string(),
        page,
        language: Language::English,
        source_kind: SourceKind::Text,
        text: text.to_string(),
        source_locator: None,
    }
}

async fn seeded_index(embedder: &HashEmbedder) -> Arc<MockVectorIndex> {
    let index = Arc::new(MockVectorIndex::with_dimension(DIM));
    let texts = [
        ("budget", 3, "The health budget grew by ten percent."),
        ("budget", 4, "Education spending stayed flat."),
        ("parks", 1, "Park maintenance schedules for summer."),
    ];
    let points = texts
        .iter()
        .enumerate()
        .map(|(i, (doc, page, text))| IndexPoint {
            segment_id: format!("{doc}-p{page}-seg{i}"),
            vector: embedder.embed_text(text),
            metadata: metadata(doc, *page, text),
        })
        .collect();
    index.upsert(points).await.unwrap();
    index
}

async fn service_with(
    reranker: Arc<dyn RerankProvider>,
    generator: Arc<dyn AnswerGenerator>,
    translator: Arc<dyn Translator>,
) -> (AskService, Arc<MockVectorIndex>) {
    let embedder = HashEmbedder::new(DIM);
    let index = seeded_index(&embedder).await;
    let retrieval = RetrievalFusion::new(
        Arc::new(embedder),
        index.clone(),
        reranker,
        EmbeddingPivot::new(Arc::new(TaggingTranslator::new())),
    )
    .with_retry(RetryPolicy::none())
    .with_identifier(Arc::new(PrefixIdentifier));

    let params = RetrievalParams {
        k: 2,
        rerank_enabled: true,
        over_fetch_k: 3,
        rerank_top_n: 2,
    };
    let service = AskService::new(retrieval, generator, translator).with_params(params);
    (service, index)
}

#[test]
fn test_user_prompt_layout() {
    let contexts = vec![
        RerankedMatch::unscored(Match {
            segment_id: "a-p2-seg0".to_string(),
            similarity_score: 0.9,
            metadata: metadata("a", 2, "  Alpha text.\n"),
        }),
        RerankedMatch::unscored(Match {
            segment_id: "b-p7-seg0".to_string(),
            similarity_score: 0.8,
            metadata: metadata("b", 7, "Beta text."),
        }),
    ];

    let prompt = build_user_prompt("  What changed? ", &contexts);

    assert_eq!(
        prompt,
        "Context:\n[a:2] Alpha text.\n[b:7] Beta text.\n\nUser question:\nWhat changed?"
    );
}

#[test]
fn test_user_prompt_without_context() {
    assert_eq!(
        build_user_prompt("q", &[]),
        "Context:\n\nUser question:\nq"
    );
}

#[test]
fn test_system_prompt_requests_citations() {
    assert!(SYSTEM_PROMPT.contains("[doc_id:PAGE]"));
}

#[test]
fn test_ask_request_defaults() {
    let request: AskRequest = serde_json::from_str(r#"{"query": "hi"}"#).unwrap();
    assert_eq!(request, AskRequest::new("hi"));
}

#[tokio::test]
async fn test_ask_returns_answer_and_citations() {
    let generator = Arc::new(StaticAnswerGenerator::new("It grew [budget:3]."));
    let (service, _) = service_with(
        Arc::new(LexicalReranker::new()),
        generator.clone(),
        Arc::new(TaggingTranslator::new()),
    )
    .await;

    let response = service
        .ask(&AskRequest::new("health budget"))
        .await
        .unwrap();

    assert_eq!(response.answer, "It grew [budget:3].");
    assert_eq!(response.citations.len(), 2);
    let top = &response.citations[0];
    assert_eq!((top.doc_id.as_str(), top.page), ("budget", 3));
    assert!(top.rerank_score.is_some());
    assert_eq!(top.snippet, "The health budget grew by ten percent.");

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[budget:3] The health budget grew by ten percent."));
    assert!(prompts[0].ends_with("User question:\nhealth budget"));
}

#[tokio::test]
async fn test_reranker_outage_still_answers() {
    let (service, _) = service_with(
        Arc::new(FailingReranker::new()),
        Arc::new(StaticAnswerGenerator::new("answer")),
        Arc::new(TaggingTranslator::new()),
    )
    .await;

    let response = service.ask(&AskRequest::new("health budget")).await.unwrap();

    assert_eq!(response.citations.len(), 2);
    assert!(response.citations.iter().all(|c| c.rerank_score.is_none()));
}

#[tokio::test]
async fn test_index_failure_returns_empty_answer() {
    let generator = Arc::new(StaticAnswerGenerator::new("unused"));
    let (service, index) = service_with(
        Arc::new(LexicalReranker::new()),
        generator.clone(),
        Arc::new(TaggingTranslator::new()),
    )
    .await;
    index.set_fail_queries(true);

    let response = service.ask(&AskRequest::new("health budget")).await.unwrap();

    assert_eq!(response, AskResponse::empty());
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_french_query_gets_french_answer() {
    let (service, _) = service_with(
        Arc::new(LexicalReranker::new()),
        Arc::new(StaticAnswerGenerator::new("The budget grew.")),
        Arc::new(TaggingTranslator::new()),
    )
    .await;

    let request = AskRequest {
        lang_hint: Some("fr".to_string()),
        ..AskRequest::new("budget de la santé")
    };
    let response = service.ask(&request).await.unwrap();

    assert_eq!(response.answer, "[en->fr] The budget grew.");
}

#[tokio::test]
async fn test_french_answer_is_not_retranslated() {
    let translator = Arc::new(TaggingTranslator::new());
    let (service, _) = service_with(
        Arc::new(LexicalReranker::new()),
        Arc::new(StaticAnswerGenerator::new("fr: Le budget a augmenté.")),
        translator.clone(),
    )
    .await;

    let response = service
        .ask(&AskRequest::new("fr: budget santé"))
        .await
        .unwrap();

    assert_eq!(response.answer, "fr: Le budget a augmenté.");
    assert_eq!(translator.calls(), 0);
}

#[tokio::test]
async fn test_back_translation_failure_keeps_answer() {
    let (service, _) = service_with(
        Arc::new(LexicalReranker::new()),
        Arc::new(StaticAnswerGenerator::new("The budget grew.")),
        Arc::new(FailingTranslator),
    )
    .await;

    let request = AskRequest {
        lang_hint: Some("fr".to_string()),
        ..AskRequest::new("budget")
    };
    let response = service.ask(&request).await.unwrap();

    assert_eq!(response.answer, "The budget grew.");
}

#[tokio::test]
async fn test_empty_query_rejected() {
    let (service, _) = service_with(
        Arc::new(LexicalReranker::new()),
        Arc::new(StaticAnswerGenerator::new("x")),
        Arc::new(TaggingTranslator::new()),
    )
    .await;

    let err = service.ask(&AskRequest::new("   ")).await.unwrap_err();
    assert!(matches!(err, AnswerError::EmptyQuery));

    let zero_k = AskRequest {
        k: Some(0),
        ..AskRequest::new("budget")
    };
    let err = service.ask(&zero_k).await.unwrap_err();
    assert!(matches!(err, AnswerError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_generation_failure_surfaces() {
    let (service, _) = service_with(
        Arc::new(LexicalReranker::new()),
        Arc::new(FailingAnswerGenerator),
        Arc::new(TaggingTranslator::new()),
    )
    .await;

    let err = service.ask(&AskRequest::new("budget")).await.unwrap_err();
    assert!(matches!(err, AnswerError::Generation { .. }));
}
