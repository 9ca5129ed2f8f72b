use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::error::GatewayError;
use super::state::AppState;
use super::{GOVDOC_STATUS_HEADER, GOVDOC_STATUS_OK};
use crate::answer::AskRequest;
use crate::document::RawElement;
use crate::ingest::{DocumentMetadata, IngestReport, IngestRequest, new_doc_id};
use crate::ocr::DEFAULT_OCR_CONTENT_TYPE;

fn ok_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(GOVDOC_STATUS_HEADER, HeaderValue::from_static(GOVDOC_STATUS_OK));
    headers
}

#[instrument(skip(state, request))]
pub async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: AskRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    if request.query.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("query must not be empty".to_string()));
    }

    let response = state.ask.ask(&request).await?;
    debug!(citations = response.citations.len(), "Ask completed");

    Ok((StatusCode::OK, ok_headers(), Json(response)).into_response())
}

/// `POST /ingest` body. Without `elements`, the configured OCR engine runs on
/// `source_locator`.
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    #[serde(default)]
    pub doc_id: Option<String>,
    pub source_locator: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub elements: Option<Vec<RawElement>>,
}

impl IngestBody {
    fn into_request(self) -> IngestRequest {
        let doc_id = self
            .doc_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(new_doc_id);

        let mut metadata = DocumentMetadata::for_file(&self.source_locator);
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            metadata.title = title;
        }
        metadata.dept = self.dept;
        metadata.date = self.date;
        metadata.language = self.language;

        match self.elements {
            Some(elements) => {
                IngestRequest::from_elements(doc_id, self.source_locator, metadata, elements)
            }
            None => IngestRequest::ocr(doc_id, self.source_locator, metadata),
        }
    }
}

#[instrument(skip(state, body))]
pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let pipeline = state
        .ingest
        .clone()
        .ok_or_else(|| GatewayError::NotConfigured("ingestion is disabled".to_string()))?;

    let body: IngestBody = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let report = pipeline.ingest(body.into_request()).await?;
    info!(doc_id = %report.doc_id, segments = report.index.segments, "Ingest completed");

    Ok((StatusCode::OK, ok_headers(), Json(report)).into_response())
}

/// `POST /upload` query string. The request body is the raw PDF.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: String,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl UploadParams {
    fn metadata(&self) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::for_file(&self.file_name);
        if let Some(title) = self.title.clone().filter(|t| !t.trim().is_empty()) {
            metadata.title = title;
        }
        metadata.dept = self.dept.clone();
        metadata.date = self.date.clone();
        metadata.language = self.language.clone();
        metadata
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub raw_key: String,
    #[serde(flatten)]
    pub report: IngestReport,
}

/// Stores the uploaded PDF, then runs OCR on the stored copy and ingests it.
#[instrument(skip(state, params, headers, body), fields(bytes = body.len()))]
pub async fn upload_handler(
    State(state): State<AppState>,
    params: Result<Query<UploadParams>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let pipeline = state
        .ingest
        .clone()
        .ok_or_else(|| GatewayError::NotConfigured("ingestion is disabled".to_string()))?;

    let Query(params) = params
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid query parameters: {}", e)))?;

    if !params.file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(GatewayError::InvalidRequest(
            "only PDF uploads are supported".to_string(),
        ));
    }
    if body.is_empty() {
        return Err(GatewayError::InvalidRequest("upload body is empty".to_string()));
    }
    if !pipeline.has_ocr() {
        return Err(GatewayError::NotConfigured(
            "no OCR engine is configured".to_string(),
        ));
    }

    let doc_id = params
        .doc_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(new_doc_id);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_OCR_CONTENT_TYPE);

    let raw_key = pipeline
        .upload(&doc_id, &params.file_name, body.to_vec(), content_type)
        .await?;

    let report = pipeline
        .ingest(IngestRequest::ocr(doc_id, raw_key.clone(), params.metadata()))
        .await?;
    info!(
        doc_id = %report.doc_id,
        raw_key = %raw_key,
        pages = report.pages,
        "Upload ingested"
    );

    Ok((StatusCode::OK, ok_headers(), Json(UploadResponse { raw_key, report })).into_response())
}
