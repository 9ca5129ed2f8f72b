use std::time::Duration;

use super::*;
use crate::document::RawElement;

fn fast_config(max_wait_ms: u64) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_wait: Duration::from_millis(max_wait_ms),
        retry: RetryPolicy::immediate(2),
    }
}

#[tokio::test]
async fn test_collects_after_pending_polls() {
    let engine = ScriptedOcrEngine::new("job-1")
        .then(OcrPoll::in_progress())
        .then(OcrPoll::in_progress())
        .then(OcrPoll::succeeded(vec![RawElement::line("l1", 1, "Hello")]));

    let elements = collect_job(&engine, "job-1", &fast_config(1_000)).await.unwrap();

    assert_eq!(elements.len(), 1);
    assert_eq!(engine.poll_tokens().len(), 3);
}

#[tokio::test]
async fn test_drains_pagination_tokens() {
    let engine = ScriptedOcrEngine::new("job-2")
        .then(OcrPoll::succeeded(vec![RawElement::line("a", 1, "A")]).with_next_page("t1"))
        .then(OcrPoll::succeeded(vec![RawElement::line("b", 2, "B")]).with_next_page("t2"))
        .then(OcrPoll::succeeded(vec![RawElement::line("c", 3, "C")]));

    let elements = collect_job(&engine, "job-2", &fast_config(1_000)).await.unwrap();

    let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(
        engine.poll_tokens(),
        vec![None, Some("t1".to_string()), Some("t2".to_string())]
    );
}

#[tokio::test]
async fn test_failed_job_reports_status() {
    let engine = ScriptedOcrEngine::new("job-3").then(OcrPoll {
        status: OcrJobStatus::PartialSuccess,
        elements: Vec::new(),
        next_page: None,
    });

    let err = collect_job(&engine, "job-3", &fast_config(1_000)).await.unwrap_err();
    assert!(matches!(
        err,
        OcrError::JobFailed {
            status: OcrJobStatus::PartialSuccess,
            ..
        }
    ));
    assert_eq!(err.job_id(), Some("job-3"));
}

#[tokio::test]
async fn test_timeout_reports_job_id() {
    let engine = ScriptedOcrEngine::new("job-4");

    let err = collect_job(&engine, "job-4", &fast_config(3)).await.unwrap_err();

    match err {
        OcrError::Timeout { ref job_id, waited } => {
            assert_eq!(job_id, "job-4");
            assert!(waited > Duration::from_millis(3));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    // Four sleeps of 1ms are needed to exceed 3ms.
    assert_eq!(engine.poll_tokens().len(), 4);
}

#[tokio::test]
async fn test_transient_poll_error_is_retried() {
    let engine = ScriptedOcrEngine::new("job-5")
        .then_error(OcrError::PollFailed {
            job_id: "job-5".to_string(),
            reason: "throttled".to_string(),
        })
        .then(OcrPoll::succeeded(Vec::new()));

    let elements = collect_job(&engine, "job-5", &fast_config(1_000)).await.unwrap();
    assert!(elements.is_empty());
}

#[tokio::test]
async fn test_run_job_submits_locator() {
    let engine = ScriptedOcrEngine::new("job-6").then(OcrPoll::succeeded(Vec::new()));

    let (job_id, _) = run_job(&engine, "raw/doc/file.pdf", DEFAULT_FEATURES, &fast_config(10))
        .await
        .unwrap();

    assert_eq!(job_id, "job-6");
    assert_eq!(engine.submitted(), vec!["raw/doc/file.pdf"]);
}

#[test]
fn test_poll_deserializes_with_defaults() {
    let poll: OcrPoll = serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
    assert_eq!(poll, OcrPoll::in_progress());
}

fn http_engine(base_url: &str) -> HttpOcrEngine {
    let store = std::sync::Arc::new(crate::storage::MemoryObjectStore::new());
    HttpOcrEngine::new(HttpOcrConfig::new(base_url).with_api_key("secret"), store).unwrap()
}

#[test]
fn test_http_engine_endpoints_trim_trailing_slash() {
    let engine = http_engine("http://ocr.local/");
    assert_eq!(engine.jobs_endpoint(), "http://ocr.local/jobs");
    assert_eq!(engine.job_endpoint("job-7"), "http://ocr.local/jobs/job-7");
}

#[test]
fn test_http_engine_debug_hides_api_key() {
    let rendered = format!("{:?}", http_engine("http://ocr.local"));
    assert!(rendered.contains("has_api_key: true"));
    assert!(!rendered.contains("secret"));
}

#[test]
fn test_features_param_lists_requested_features() {
    assert_eq!(super::http::features_param(DEFAULT_FEATURES), "tables,forms");
    assert_eq!(super::http::features_param(&[]), "");
}

#[tokio::test]
async fn test_http_engine_submit_of_missing_object_fails_before_request() {
    let engine = http_engine("http://127.0.0.1:9");

    let err = engine
        .submit("doc-1/missing.pdf", DEFAULT_FEATURES)
        .await
        .unwrap_err();

    assert!(matches!(err, OcrError::SubmitFailed { ref locator, .. } if locator == "doc-1/missing.pdf"));
    assert_eq!(err.job_id(), None);
}
