//! REST-backed resource source for a workspace
//!
//! Every listing endpoint returns an envelope object with the records under a
//! per-endpoint key. Records are decoded one by one so a single malformed
//! entry is dropped instead of failing the listing.

use super::ResourceSource;
use crate::error::SourceError;
use crate::models::{
    App, Cluster, ClusterPolicy, InstancePool, Job, JobRun, ModelServingEndpoint,
    ProvisionedStore, SqlWarehouse, VectorSearchEndpoint,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const JOBS_LIST: &str = "/api/2.1/jobs/list";
const JOB_RUNS_LIST: &str = "/api/2.1/jobs/runs/list";
const CLUSTERS_LIST: &str = "/api/2.1/clusters/list";
const WAREHOUSES_LIST: &str = "/api/2.0/sql/warehouses";
const POOLS_LIST: &str = "/api/2.0/instance-pools/list";
const VECTOR_SEARCH_LIST: &str = "/api/2.0/vector-search/endpoints";
const POLICIES_LIST: &str = "/api/2.0/policies/clusters/list";
const APPS_LIST: &str = "/api/2.0/apps";
const DATABASE_INSTANCES_LIST: &str = "/api/2.0/database/instances";
const SERVING_ENDPOINTS_LIST: &str = "/api/2.0/serving-endpoints";

/// Upper bound on followed pagination tokens per listing
const MAX_PAGES: usize = 100;

/// Connection settings for a workspace
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Workspace base URL, e.g. "https://adb-123.azuredatabricks.net"
    pub host: String,
    /// Personal access token sent as a bearer credential
    pub token: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkspaceConfig {
    /// Both host and token are required to reach the workspace
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty() && !self.token.trim().is_empty()
    }
}

/// Lists workspace resources over the REST API
pub struct WorkspaceSource {
    client: Client,
    base_url: Url,
    token: String,
}

impl WorkspaceSource {
    pub fn new(config: WorkspaceConfig) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let base_url = Url::parse(config.host.trim_end_matches('/'))?;

        debug!(host = %base_url, "Workspace source initialized");

        Ok(Self {
            client,
            base_url,
            token: config.token,
        })
    }

    async fn get_page(&self, path: &str, query: &[(&str, String)]) -> Result<Value, SourceError> {
        let url = self.base_url.join(path)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    /// Fetch every page of a listing and decode the records under `key`
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut params = query.to_vec();
            if let Some(token) = page_token.take() {
                params.push(("page_token", token));
            }

            let mut page = self.get_page(path, &params).await?;
            items.extend(decode_items(&mut page, key, path));

            match page.get("next_page_token").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(path, count = items.len(), "Listed workspace resources");
        Ok(items)
    }
}

fn decode_items<T: DeserializeOwned>(page: &mut Value, key: &str, path: &str) -> Vec<T> {
    let raw = match page.get_mut(key).map(Value::take) {
        Some(Value::Array(raw)) => raw,
        Some(Value::Null) | None => return Vec::new(),
        Some(other) => {
            warn!(path, key, kind = %json_kind(&other), "Listing field is not an array");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl ResourceSource for WorkspaceSource {
    async fn clusters(&self) -> Result<Vec<Cluster>, SourceError> {
        self.list(CLUSTERS_LIST, "clusters", &[]).await
    }

    async fn jobs(&self) -> Result<Vec<Job>, SourceError> {
        self.list(JOBS_LIST, "jobs", &[]).await
    }

    async fn job_runs(&self, job_id: i64, limit: usize) -> Result<Vec<JobRun>, SourceError> {
        let query = [("job_id", job_id.to_string()), ("limit", limit.to_string())];
        let mut page = self.get_page(JOB_RUNS_LIST, &query).await?;
        let mut runs: Vec<JobRun> = decode_items(&mut page, "runs", JOB_RUNS_LIST);
        runs.truncate(limit);
        Ok(runs)
    }

    async fn sql_warehouses(&self) -> Result<Vec<SqlWarehouse>, SourceError> {
        self.list(WAREHOUSES_LIST, "warehouses", &[]).await
    }

    async fn pools(&self) -> Result<Vec<InstancePool>, SourceError> {
        self.list(POOLS_LIST, "instance_pools", &[]).await
    }

    async fn vector_search_endpoints(&self) -> Result<Vec<VectorSearchEndpoint>, SourceError> {
        self.list(VECTOR_SEARCH_LIST, "endpoints", &[]).await
    }

    async fn policies(&self) -> Result<Vec<ClusterPolicy>, SourceError> {
        self.list(POLICIES_LIST, "policies", &[]).await
    }

    async fn apps(&self) -> Result<Vec<App>, SourceError> {
        self.list(APPS_LIST, "apps", &[]).await
    }

    async fn provisioned_stores(&self) -> Result<Vec<ProvisionedStore>, SourceError> {
        self.list(DATABASE_INSTANCES_LIST, "database_instances", &[])
            .await
    }

    async fn model_serving_endpoints(&self) -> Result<Vec<ModelServingEndpoint>, SourceError> {
        self.list(SERVING_ENDPOINTS_LIST, "endpoints", &[]).await
    }
}
