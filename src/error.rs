use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Batch-level failures. These abort the whole request.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Missing or invalid NPI parameter")]
    InvalidInput,

    #[error("No valid NPI numbers provided")]
    NoValidInput,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl LookupError {
    pub fn status(&self) -> StatusCode {
        match self {
            LookupError::InvalidInput | LookupError::NoValidInput => StatusCode::BAD_REQUEST,
            LookupError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            LookupError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            LookupError::Internal(source) => {
                tracing::error!(error = ?source, "NPI batch lookup failed");
            }
            other => tracing::warn!(status = %status, "Rejected NPI lookup: {other}"),
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Per-identifier failures. Captured into the record for that NPI only.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no registry results for NPI {0}")]
    NotFound(String),

    #[error("registry request for NPI {0} timed out")]
    Timeout(String),

    #[error("registry lookup for NPI {npi} failed: {reason}")]
    Upstream { npi: String, reason: String },
}

impl FetchError {
    pub fn upstream(npi: &str, reason: impl Into<String>) -> Self {
        FetchError::Upstream {
            npi: npi.to_string(),
            reason: reason.into(),
        }
    }

    /// Client-facing text; upstream detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "No provider found for this NPI",
            FetchError::Timeout(_) => "Request timed out",
            FetchError::Upstream { .. } => "Failed to retrieve provider data",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_errors_map_to_http_status() {
        assert_eq!(LookupError::InvalidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(LookupError::NoValidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            LookupError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            LookupError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_hides_source_text() {
        let err = LookupError::Internal(anyhow::anyhow!("task panicked at secret.rs:12"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn fetch_errors_have_distinct_public_messages() {
        let timeout = FetchError::Timeout("1417005489".into());
        let upstream = FetchError::upstream("1417005489", "HTTP 503");
        let missing = FetchError::NotFound("1417005489".into());

        assert_eq!(timeout.public_message(), "Request timed out");
        assert_eq!(upstream.public_message(), "Failed to retrieve provider data");
        assert_ne!(timeout.public_message(), upstream.public_message());
        assert_ne!(missing.public_message(), upstream.public_message());
        assert!(upstream.to_string().contains("HTTP 503"));
    }
}
