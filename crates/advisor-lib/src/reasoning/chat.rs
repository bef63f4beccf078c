//! Chat-completions client for OpenAI and Azure OpenAI deployments

use super::ReasoningCapability;
use crate::error::ReasoningError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Which chat-completions flavour to talk to
#[derive(Debug, Clone, PartialEq)]
pub enum ChatProvider {
    OpenAi {
        api_key: String,
        base_url: String,
    },
    Azure {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
}

/// Configuration for the reasoning client
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub provider: ChatProvider,
    /// Model name; ignored by Azure, where the deployment selects the model
    pub model: String,
    pub temperature: f32,
    /// HTTP-level request timeout
    pub request_timeout: Duration,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: ChatProvider::OpenAi {
                api_key: String::new(),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            },
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Reasoning capability backed by a chat-completions endpoint
pub struct ChatCompletionClient {
    client: Client,
    config: ReasoningConfig,
    url: Url,
}

impl ChatCompletionClient {
    pub fn new(config: ReasoningConfig) -> Result<Self, ReasoningError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let url = completions_url(&config.provider)?;
        Ok(Self {
            client,
            config,
            url,
        })
    }

    pub fn provider_name(&self) -> &'static str {
        match self.config.provider {
            ChatProvider::OpenAi { .. } => "openai",
            ChatProvider::Azure { .. } => "azure",
        }
    }
}

fn completions_url(provider: &ChatProvider) -> Result<Url, ReasoningError> {
    match provider {
        ChatProvider::OpenAi { base_url, .. } => {
            Ok(Url::parse(base_url)?.join("/v1/chat/completions")?)
        }
        ChatProvider::Azure {
            endpoint,
            deployment,
            api_version,
            ..
        } => {
            let mut url = Url::parse(endpoint)?
                .join(&format!("/openai/deployments/{}/chat/completions", deployment))?;
            url.query_pairs_mut().append_pair("api-version", api_version);
            Ok(url)
        }
    }
}

#[async_trait]
impl ReasoningCapability for ChatCompletionClient {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasoningError> {
        let model = match self.config.provider {
            ChatProvider::OpenAi { .. } => Some(self.config.model.as_str()),
            ChatProvider::Azure { .. } => None,
        };
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let request = self.client.post(self.url.clone()).json(&body);
        let request = match &self.config.provider {
            ChatProvider::OpenAi { api_key, .. } => request.bearer_auth(api_key),
            ChatProvider::Azure { api_key, .. } => request.header("api-key", api_key),
        };

        debug!(provider = self.provider_name(), prompt_len = prompt.len(), "Invoking reasoning");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningError::Status { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ReasoningError::EmptyResponse)
    }
}
