//! Error taxonomy of the relay.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Rejections raised while validating an inbound chat request.
///
/// These are reported synchronously, before the backend is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Prompt is required.")]
    MissingPrompt,

    #[error("Request body must be valid JSON.")]
    MalformedBody,
}

/// Failures while talking to the inference backend or decoding its output.
///
/// A `BackendError` is always the last item of a token stream. The relay renders it inline
/// instead of failing the HTTP transaction.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {}{}", .status, detail_suffix(.detail))]
    Status { status: StatusCode, detail: String },

    #[error("backend reported an error: {0}")]
    Remote(String),

    #[error("connection to backend lost: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed event from backend: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("backend sent no data for {0:?}")]
    Idle(Duration),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}
