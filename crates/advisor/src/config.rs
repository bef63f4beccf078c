//! Advisor configuration

use advisor_lib::reasoning::{
    ChatProvider, ReasoningConfig, DEFAULT_AZURE_API_VERSION, DEFAULT_MODEL,
    DEFAULT_OPENAI_BASE_URL,
};
use advisor_lib::source::{InventoryConfig, WorkspaceConfig};
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Advisor configuration, read from `ADVISOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Instance name attached to structured log events
    pub instance_name: String,

    /// Port for the analysis, health and metrics API
    pub api_port: u16,

    /// Workspace base URL
    pub workspace_host: String,

    /// Workspace access token
    pub workspace_token: String,

    /// Saved inventory served when no workspace is configured
    pub inventory_snapshot_path: Option<String>,

    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,

    pub azure_endpoint: String,
    pub azure_api_key: String,
    pub azure_deployment: String,
    pub azure_api_version: String,

    /// Bound on each resource listing, in seconds
    pub fetch_timeout_secs: u64,

    /// Bound on the reasoning call, in seconds
    pub reasoning_timeout_secs: u64,

    /// Bound on a whole analysis run, in seconds
    pub analysis_timeout_secs: u64,

    /// Jobs whose run history is fetched
    pub job_run_sample_size: usize,

    /// Runs fetched per sampled job
    pub job_run_limit: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            instance_name: "compute-advisor".to_string(),
            api_port: 8000,
            workspace_host: String::new(),
            workspace_token: String::new(),
            inventory_snapshot_path: None,
            openai_api_key: String::new(),
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            azure_endpoint: String::new(),
            azure_api_key: String::new(),
            azure_deployment: String::new(),
            azure_api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            fetch_timeout_secs: 30,
            reasoning_timeout_secs: 120,
            analysis_timeout_secs: 600,
            job_run_sample_size: 10,
            job_run_limit: 10,
        }
    }
}

fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}

impl AdvisorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ADVISOR").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn workspace(&self) -> WorkspaceConfig {
        WorkspaceConfig {
            host: self.workspace_host.clone(),
            token: self.workspace_token.clone(),
            request_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }

    pub fn inventory(&self) -> InventoryConfig {
        InventoryConfig {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            job_run_sample_size: self.job_run_sample_size,
            job_run_limit: self.job_run_limit,
        }
    }

    /// Reasoning client settings; Azure wins when fully configured
    pub fn reasoning(&self) -> Option<ReasoningConfig> {
        let provider = if is_set(&self.azure_endpoint)
            && is_set(&self.azure_api_key)
            && is_set(&self.azure_deployment)
        {
            ChatProvider::Azure {
                endpoint: self.azure_endpoint.clone(),
                api_key: self.azure_api_key.clone(),
                deployment: self.azure_deployment.clone(),
                api_version: self.azure_api_version.clone(),
            }
        } else if is_set(&self.openai_api_key) {
            ChatProvider::OpenAi {
                api_key: self.openai_api_key.clone(),
                base_url: self.openai_base_url.clone(),
            }
        } else {
            return None;
        };

        Some(ReasoningConfig {
            provider,
            model: self.openai_model.clone(),
            request_timeout: self.reasoning_timeout(),
            ..ReasoningConfig::default()
        })
    }

    pub fn reasoning_timeout(&self) -> Duration {
        Duration::from_secs(self.reasoning_timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    pub fn snapshot_path(&self) -> Option<&str> {
        self.inventory_snapshot_path.as_deref().filter(|p| is_set(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::default();

        assert_eq!(config.api_port, 8000);
        assert!(!config.workspace().is_configured());
        assert!(config.reasoning().is_none());
        assert!(config.snapshot_path().is_none());
        assert_eq!(config.inventory().job_run_sample_size, 10);
        assert_eq!(config.analysis_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_openai_provider() {
        let config = AdvisorConfig {
            openai_api_key: "sk-test".to_string(),
            ..Default::default()
        };

        let reasoning = config.reasoning().unwrap();

        assert_eq!(reasoning.model, DEFAULT_MODEL);
        assert_eq!(reasoning.request_timeout, Duration::from_secs(120));
        assert!(matches!(reasoning.provider, ChatProvider::OpenAi { .. }));
    }

    #[test]
    fn test_azure_preferred_when_complete() {
        let config = AdvisorConfig {
            openai_api_key: "sk-test".to_string(),
            azure_endpoint: "https://example.openai.azure.com".to_string(),
            azure_api_key: "az-key".to_string(),
            azure_deployment: "gpt4".to_string(),
            ..Default::default()
        };

        match config.reasoning().unwrap().provider {
            ChatProvider::Azure {
                deployment,
                api_version,
                ..
            } => {
                assert_eq!(deployment, "gpt4");
                assert_eq!(api_version, DEFAULT_AZURE_API_VERSION);
            }
            other => panic!("expected azure provider, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_azure_falls_back_to_openai() {
        let config = AdvisorConfig {
            openai_api_key: "sk-test".to_string(),
            azure_endpoint: "https://example.openai.azure.com".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            config.reasoning().unwrap().provider,
            ChatProvider::OpenAi { .. }
        ));
    }

    #[test]
    fn test_blank_snapshot_path_ignored() {
        let config = AdvisorConfig {
            inventory_snapshot_path: Some("  ".to_string()),
            ..Default::default()
        };

        assert!(config.snapshot_path().is_none());
    }
}
