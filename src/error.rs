use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::publish::StoreError;

/// Failure kinds surfaced at every operation boundary.
///
/// Quality issues found in generated widgets are never represented here;
/// they travel inside successful results as warnings.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A required field was missing or empty. Not retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Network failure or non-2xx status while fetching an article.
    #[error("Failed to fetch content: {0}")]
    Fetch(String),
    /// The article fetch exceeded its deadline.
    #[error("Timed out fetching content: {0}")]
    Timeout(String),
    /// The readability pass found no usable text.
    #[error("Failed to extract main content from the URL.")]
    ExtractionEmpty,
    /// The generative text service call failed.
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Content store error: {0}")]
    Store(#[from] StoreError),
}

pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::Fetch(_) => "FetchError",
            Self::Timeout(_) => "TimeoutError",
            Self::ExtractionEmpty => "ExtractionEmpty",
            Self::Generation(_) => "GenerationError",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Store(_) => "StoreError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ExtractionEmpty => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Fetch(_) | Self::Generation(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap a generative-service failure, keeping the full cause chain.
    pub fn generation(err: anyhow::Error) -> Self {
        Self::Generation(format!("{:#}", err))
    }
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            // The client shows `error` verbatim, so keep it short and put the
            // cause in `details`.
            Self::Fetch(details) | Self::Timeout(details) => serde_json::json!({
                "error": "Failed to extract content",
                "kind": self.kind(),
                "details": details,
            }),
            Self::Generation(details) => serde_json::json!({
                "error": "Failed to generate tool",
                "kind": self.kind(),
                "details": details,
            }),
            Self::Store(err) => serde_json::json!({
                "error": "Content store request failed",
                "kind": self.kind(),
                "details": err.to_string(),
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
                "kind": self.kind(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ToolError::InvalidInput("url".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ToolError::ExtractionEmpty.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ToolError::Timeout("slow".into()).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ToolError::Generation("boom".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_generation_keeps_cause_chain() {
        let err = anyhow::anyhow!("connection reset").context("LLM request failed");
        let tool_err = ToolError::generation(err);
        assert_eq!(tool_err.kind(), "GenerationError");
        assert!(tool_err.to_string().contains("LLM request failed"));
        assert!(tool_err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_response_body_carries_kind() {
        let resp = ToolError::ExtractionEmpty.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], "ExtractionEmpty");
        assert_eq!(json["error"], "Failed to extract main content from the URL.");
    }
}
