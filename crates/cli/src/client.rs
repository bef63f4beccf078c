//! API client for communicating with the Compute Advisor service

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// API client for the Compute Advisor service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            // Analyses may run for several minutes
            .timeout(std::time::Duration::from_secs(600))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a GET request, decoding the body whatever the status
    pub async fn get_with_status<T: DeserializeOwned>(&self, path: &str) -> Result<(StatusCode, T)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }

    /// Make a POST request without a body
    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn analyze(&self) -> Result<AnalyzeResponse> {
        self.post("api/v1/analyze").await
    }

    pub async fn recommendations(&self) -> Result<CachedAnalysis> {
        self.get("api/v1/recommendations").await
    }

    pub async fn summary(&self) -> Result<Summary> {
        self.get("api/v1/summary").await
    }

    pub async fn health(&self) -> Result<(StatusCode, HealthReport)> {
        self.get_with_status("healthz").await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.get("api/v1/stats").await
    }

    /// Raw listing under `api/v1/<path>`
    pub async fn listing(&self, path: &str) -> Result<Vec<Value>> {
        self.get(&format!("api/v1/{}", path)).await
    }

    pub async fn job_runs(&self, job_id: i64, limit: Option<usize>) -> Result<Vec<Value>> {
        let path = match limit {
            Some(limit) => format!("api/v1/jobs/{}/runs?limit={}", job_id, limit),
            None => format!("api/v1/jobs/{}/runs", job_id),
        };
        self.get(&path).await
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_savings: Option<String>,
    #[serde(default)]
    pub risk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

impl Recommendation {
    /// Resource id as display text; numeric and string ids look the same
    pub fn resource_id_text(&self) -> String {
        match &self.resource_id {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub resource_counts: BTreeMap<String, usize>,
    pub total_resources: usize,
    pub recommendation_count: usize,
    pub timestamp: String,
    pub analysis_type: String,
    pub reasoning_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
    pub summary: RunReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub has_analysis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub jobs_analyzed: usize,
    #[serde(default)]
    pub clusters_analyzed: usize,
    #[serde(default)]
    pub has_analysis: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessMetrics {
    pub recommendations_generated: usize,
    pub high_priority_actions: usize,
    pub potential_monthly_savings: f64,
    pub optimization_coverage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_cost_savings: f64,
    pub total_cost_savings_formatted: String,
    pub total_recommendations: usize,
    pub jobs_identified: usize,
    pub resources_optimized: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub savings_by_type: BTreeMap<String, f64>,
    pub resources_by_type: BTreeMap<String, usize>,
    #[serde(default)]
    pub analysis_metadata: AnalysisMetadata,
    #[serde(default)]
    pub success_metrics: SuccessMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub source_configured: bool,
    pub reasoning_configured: bool,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentReport>,
}

/// Live resource counts; per-kind counts are kept as they arrive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub running_clusters: usize,
    pub idle_clusters: usize,
    pub timestamp: String,
    #[serde(flatten)]
    pub counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
