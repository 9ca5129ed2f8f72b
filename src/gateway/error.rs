use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::{GOVDOC_STATUS_ERROR, GOVDOC_STATUS_HEADER};
use crate::answer::AnswerError;
use crate::ingest::IngestError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("upstream dependency failed: {0}")]
    DependencyFailed(String),
}

impl From<AnswerError> for GatewayError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::EmptyQuery | AnswerError::InvalidRequest { .. } => {
                GatewayError::InvalidRequest(err.to_string())
            }
            AnswerError::Generation { .. } => GatewayError::DependencyFailed(err.to_string()),
        }
    }
}

impl From<IngestError> for GatewayError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidRequest { .. } => GatewayError::InvalidRequest(err.to_string()),
            IngestError::OcrUnavailable { .. } => GatewayError::NotConfigured(err.to_string()),
            IngestError::Stage { .. } => GatewayError::DependencyFailed(err.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::DependencyFailed(_) => StatusCode::BAD_GATEWAY,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            GOVDOC_STATUS_HEADER,
            HeaderValue::from_static(GOVDOC_STATUS_ERROR),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
