//! LLM-backed reasoning pass
//!
//! The capability is a seam: anything that turns a prompt into text. The
//! adapter owns prompting, the timeout and decoding, and reports what
//! happened as a [`ReasoningOutcome`] instead of an error.

mod adapter;
mod chat;

pub use adapter::{
    build_prompt, decode_recommendations, parse_recommendations, ReasoningAdapter, REASONING_TIMEOUT,
};
pub use chat::{
    ChatCompletionClient, ChatProvider, ReasoningConfig, DEFAULT_AZURE_API_VERSION, DEFAULT_MODEL,
    DEFAULT_OPENAI_BASE_URL,
};

use crate::error::ReasoningError;
use crate::models::Recommendation;
use async_trait::async_trait;

/// Text-in, text-out reasoning service
#[async_trait]
pub trait ReasoningCapability: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasoningError>;
}

/// Result of one reasoning attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningOutcome {
    /// Decoded, non-empty recommendation list
    Success(Vec<Recommendation>),
    /// The service answered but had nothing to recommend
    Deferred,
    /// Invocation, timeout or decoding failed; carries the error label
    Failed(String),
}

impl ReasoningOutcome {
    /// Label used for the fallback metric; `None` on success
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            ReasoningOutcome::Success(_) => None,
            ReasoningOutcome::Deferred => Some("deferred"),
            ReasoningOutcome::Failed(reason) => Some(reason.as_str()),
        }
    }
}
