//! Error types for the advisor library

use std::time::Duration;
use thiserror::Error;

/// Failure while reading resources from the workspace
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("workspace request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("workspace returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected workspace payload: {0}")]
    Decode(String),

    #[error("invalid workspace URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure while invoking or interpreting the reasoning capability
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("reasoning request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("reasoning service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("reasoning service returned no content")]
    EmptyResponse,

    #[error("reasoning call timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not decode reasoning output: {0}")]
    Parse(String),

    #[error("invalid reasoning endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl ReasoningError {
    /// Short label used for metrics and log fields
    pub fn label(&self) -> &'static str {
        match self {
            ReasoningError::Http(_) | ReasoningError::Url(_) => "transport",
            ReasoningError::Status { .. } => "status",
            ReasoningError::EmptyResponse => "empty",
            ReasoningError::Timeout(_) => "timeout",
            ReasoningError::Parse(_) => "parse",
        }
    }
}

/// Run-level failure surfaced to the caller of an analysis
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("resource source not configured")]
    SourceNotConfigured,

    #[error("analysis did not finish within {0:?}")]
    AnalysisTimeout(Duration),
}
