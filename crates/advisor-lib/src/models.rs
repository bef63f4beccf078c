//! Core data models for the compute advisor
//!
//! Resource records mirror the workspace REST payloads but are deserialized
//! leniently: absent or `null` fields fall back to defaults instead of
//! failing the whole listing.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// State string reported by running clusters and warehouses
pub const STATE_RUNNING: &str = "RUNNING";

/// Ready marker reported by model serving endpoints
pub const SERVING_READY: &str = "READY";

/// Kinds of compute resources analyzed by the advisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Cluster,
    Job,
    SqlWarehouse,
    Pool,
    VectorSearchEndpoint,
    Policy,
    App,
    ProvisionedStore,
    MlJob,
    ModelServingEndpoint,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Cluster,
        ResourceKind::Job,
        ResourceKind::SqlWarehouse,
        ResourceKind::Pool,
        ResourceKind::VectorSearchEndpoint,
        ResourceKind::Policy,
        ResourceKind::App,
        ResourceKind::ProvisionedStore,
        ResourceKind::MlJob,
        ResourceKind::ModelServingEndpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::Job => "job",
            ResourceKind::SqlWarehouse => "sql_warehouse",
            ResourceKind::Pool => "pool",
            ResourceKind::VectorSearchEndpoint => "vector_search_endpoint",
            ResourceKind::Policy => "policy",
            ResourceKind::App => "app",
            ResourceKind::ProvisionedStore => "provisioned_store",
            ResourceKind::MlJob => "ml_job",
            ResourceKind::ModelServingEndpoint => "model_serving_endpoint",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource identifier; jobs use integers, everything else uses strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Str(id)
    }
}

/// Treat an explicit `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Cluster state arrives either as a plain string or as `{"cluster_state": ...}`
fn lenient_state<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let state = match value {
        Some(Value::String(s)) => s,
        Some(Value::Object(map)) => map
            .get("cluster_state")
            .or_else(|| map.get("state"))
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string(),
        _ => "UNKNOWN".to_string(),
    };
    Ok(state)
}

/// Savings figures are free-form text, but reasoning output sometimes uses bare numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Free text that may arrive as `null` or a scalar; `null` becomes empty
fn text_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(deserializer)?.unwrap_or_default())
}

/// Decode into `T`, falling back to its default for `null` or a value of the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// Steps arrive as a list, or occasionally as one string
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = |v: Value| match v {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(text)
                .collect(),
        ),
        Some(other) => Some(vec![text(other)]),
    })
}

/// A number, or a string holding one
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Resource records
// ---------------------------------------------------------------------------

/// All-purpose compute cluster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub cluster_id: String,
    pub cluster_name: Option<String>,
    #[serde(deserialize_with = "lenient_state")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub num_workers: u32,
    pub node_type_id: Option<String>,
    pub driver_node_type_id: Option<String>,
    pub spark_version: Option<String>,
    pub autotermination_minutes: Option<u32>,
    pub cluster_source: Option<String>,
    pub autoscale: Option<Autoscale>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Autoscale {
    pub min_workers: Option<u32>,
    pub max_workers: Option<u32>,
}

impl Cluster {
    pub fn display_name(&self) -> String {
        self.cluster_name
            .clone()
            .unwrap_or_else(|| format!("Cluster-{}", self.cluster_id))
    }

    pub fn is_running(&self) -> bool {
        self.state == STATE_RUNNING
    }
}

/// Scheduled job definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub job_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub settings: JobSettings,
    pub creator_user_name: Option<String>,
    pub created_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tasks: Vec<JobTask>,
    pub schedule: Option<Value>,
    pub timeout_seconds: Option<u64>,
    pub max_concurrent_runs: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTask {
    pub task_key: Option<String>,
    #[serde(alias = "cluster_id")]
    pub existing_cluster_id: Option<String>,
    pub new_cluster: Option<Value>,
}

impl Job {
    pub fn display_name(&self) -> String {
        self.settings
            .name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn tasks(&self) -> &[JobTask] {
        &self.settings.tasks
    }
}

/// One historical execution of a job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRun {
    pub run_id: i64,
    pub job_id: i64,
    pub run_name: Option<String>,
    pub state: Option<RunState>,
    /// Epoch milliseconds
    pub start_time: Option<i64>,
    /// Epoch milliseconds; 0 while the run is still active
    pub end_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    pub life_cycle_state: Option<String>,
    pub result_state: Option<String>,
    pub state_message: Option<String>,
}

impl JobRun {
    /// Run duration in seconds, only when both endpoints are known
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if start > 0 && end > 0 && end >= start => {
                Some((end - start) as f64 / 1000.0)
            }
            _ => None,
        }
    }
}

/// SQL warehouse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlWarehouse {
    pub id: String,
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    pub cluster_size: Option<String>,
    pub warehouse_type: Option<String>,
    pub auto_stop_mins: Option<u32>,
    pub max_num_clusters: Option<u32>,
}

impl SqlWarehouse {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Instance pool with its usage counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancePool {
    pub instance_pool_id: String,
    pub instance_pool_name: Option<String>,
    pub node_type_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub min_idle_instances: u32,
    pub max_capacity: Option<u32>,
    pub idle_instance_autotermination_minutes: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub stats: PoolStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolStats {
    pub used_count: u32,
    pub idle_count: u32,
    pub pending_used_count: u32,
    pub pending_idle_count: u32,
}

impl InstancePool {
    pub fn display_name(&self) -> String {
        self.instance_pool_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Instances currently attached to clusters, including pending ones
    pub fn active_instances(&self) -> u32 {
        self.stats.used_count + self.stats.pending_used_count
    }
}

/// State block shared by several workspace payloads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBlock {
    pub state: Option<String>,
    pub message: Option<String>,
}

/// Vector search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSearchEndpoint {
    pub id: Option<String>,
    pub name: String,
    pub endpoint_type: Option<String>,
    pub endpoint_status: Option<StatusBlock>,
    pub num_indexes: Option<u32>,
}

/// Cluster policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterPolicy {
    pub policy_id: String,
    pub name: Option<String>,
    pub definition: Option<String>,
    pub is_default: Option<bool>,
}

/// Hosted application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub name: String,
    pub description: Option<String>,
    pub app_status: Option<StatusBlock>,
    pub compute_status: Option<StatusBlock>,
}

/// Provisioned database instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionedStore {
    pub name: String,
    pub uid: Option<String>,
    pub state: Option<String>,
    pub capacity: Option<String>,
    pub node_count: Option<u32>,
}

/// Model serving endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelServingEndpoint {
    pub id: Option<String>,
    pub name: String,
    pub creator: Option<String>,
    pub state: Option<ServingState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingState {
    pub ready: Option<String>,
    pub config_update: Option<String>,
}

impl ModelServingEndpoint {
    pub fn is_ready(&self) -> bool {
        self.state
            .as_ref()
            .and_then(|s| s.ready.as_deref())
            .map(|ready| ready == SERVING_READY)
            .unwrap_or(false)
    }
}

/// Borrowed view over any resource record, tagged by kind
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Cluster(&'a Cluster),
    Job(&'a Job),
    SqlWarehouse(&'a SqlWarehouse),
    Pool(&'a InstancePool),
    VectorSearchEndpoint(&'a VectorSearchEndpoint),
    Policy(&'a ClusterPolicy),
    App(&'a App),
    ProvisionedStore(&'a ProvisionedStore),
    MlJob(&'a Job),
    ModelServingEndpoint(&'a ModelServingEndpoint),
}

impl Resource<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Cluster(_) => ResourceKind::Cluster,
            Resource::Job(_) => ResourceKind::Job,
            Resource::SqlWarehouse(_) => ResourceKind::SqlWarehouse,
            Resource::Pool(_) => ResourceKind::Pool,
            Resource::VectorSearchEndpoint(_) => ResourceKind::VectorSearchEndpoint,
            Resource::Policy(_) => ResourceKind::Policy,
            Resource::App(_) => ResourceKind::App,
            Resource::ProvisionedStore(_) => ResourceKind::ProvisionedStore,
            Resource::MlJob(_) => ResourceKind::MlJob,
            Resource::ModelServingEndpoint(_) => ResourceKind::ModelServingEndpoint,
        }
    }

    pub fn id(&self) -> ResourceId {
        match self {
            Resource::Cluster(c) => c.cluster_id.as_str().into(),
            Resource::Job(j) | Resource::MlJob(j) => j.job_id.into(),
            Resource::SqlWarehouse(w) => w.id.as_str().into(),
            Resource::Pool(p) => p.instance_pool_id.as_str().into(),
            Resource::VectorSearchEndpoint(e) => {
                e.id.clone().unwrap_or_else(|| e.name.clone()).into()
            }
            Resource::Policy(p) => p.policy_id.as_str().into(),
            Resource::App(a) => a.name.as_str().into(),
            Resource::ProvisionedStore(s) => s.name.as_str().into(),
            Resource::ModelServingEndpoint(e) => e.name.as_str().into(),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Resource::Cluster(c) => c.display_name(),
            Resource::Job(j) | Resource::MlJob(j) => j.display_name(),
            Resource::SqlWarehouse(w) => w.display_name(),
            Resource::Pool(p) => p.display_name(),
            Resource::VectorSearchEndpoint(e) => e.name.clone(),
            Resource::Policy(p) => p.name.clone().unwrap_or_else(|| p.policy_id.clone()),
            Resource::App(a) => a.name.clone(),
            Resource::ProvisionedStore(s) => s.name.clone(),
            Resource::ModelServingEndpoint(e) => e.name.clone(),
        }
    }
}

/// Everything fetched from the workspace for one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceInventory {
    pub clusters: Vec<Cluster>,
    pub jobs: Vec<Job>,
    pub sql_warehouses: Vec<SqlWarehouse>,
    pub pools: Vec<InstancePool>,
    pub vector_search_endpoints: Vec<VectorSearchEndpoint>,
    pub policies: Vec<ClusterPolicy>,
    pub apps: Vec<App>,
    pub provisioned_stores: Vec<ProvisionedStore>,
    pub ml_jobs: Vec<Job>,
    pub model_serving_endpoints: Vec<ModelServingEndpoint>,
    /// Run history keyed by job id; only sampled jobs are present
    pub job_runs: HashMap<i64, Vec<JobRun>>,
}

impl ResourceInventory {
    /// Iterate over every resource in kind order
    pub fn resources(&self) -> impl Iterator<Item = Resource<'_>> {
        self.clusters
            .iter()
            .map(Resource::Cluster)
            .chain(self.jobs.iter().map(Resource::Job))
            .chain(self.sql_warehouses.iter().map(Resource::SqlWarehouse))
            .chain(self.pools.iter().map(Resource::Pool))
            .chain(
                self.vector_search_endpoints
                    .iter()
                    .map(Resource::VectorSearchEndpoint),
            )
            .chain(self.policies.iter().map(Resource::Policy))
            .chain(self.apps.iter().map(Resource::App))
            .chain(self.provisioned_stores.iter().map(Resource::ProvisionedStore))
            .chain(self.ml_jobs.iter().map(Resource::MlJob))
            .chain(
                self.model_serving_endpoints
                    .iter()
                    .map(Resource::ModelServingEndpoint),
            )
    }

    pub fn counts(&self) -> ResourceCounts {
        let mut counts = ResourceCounts::default();
        for resource in self.resources() {
            counts.increment(resource.kind());
        }
        counts
    }

    pub fn runs_for(&self, job_id: i64) -> &[JobRun] {
        self.job_runs
            .get(&job_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Number of resources analyzed, per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCounts {
    pub clusters: usize,
    pub jobs: usize,
    pub sql_warehouses: usize,
    pub pools: usize,
    pub vector_search_endpoints: usize,
    pub policies: usize,
    pub apps: usize,
    pub provisioned_stores: usize,
    pub ml_jobs: usize,
    pub model_serving_endpoints: usize,
}

impl ResourceCounts {
    fn slot_mut(&mut self, kind: ResourceKind) -> &mut usize {
        match kind {
            ResourceKind::Cluster => &mut self.clusters,
            ResourceKind::Job => &mut self.jobs,
            ResourceKind::SqlWarehouse => &mut self.sql_warehouses,
            ResourceKind::Pool => &mut self.pools,
            ResourceKind::VectorSearchEndpoint => &mut self.vector_search_endpoints,
            ResourceKind::Policy => &mut self.policies,
            ResourceKind::App => &mut self.apps,
            ResourceKind::ProvisionedStore => &mut self.provisioned_stores,
            ResourceKind::MlJob => &mut self.ml_jobs,
            ResourceKind::ModelServingEndpoint => &mut self.model_serving_endpoints,
        }
    }

    pub fn increment(&mut self, kind: ResourceKind) {
        *self.slot_mut(kind) += 1;
    }

    pub fn get(&self, kind: ResourceKind) -> usize {
        let mut copy = *self;
        *copy.slot_mut(kind)
    }

    pub fn total(&self) -> usize {
        ResourceKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Category of a recommendation
///
/// Reasoning output is free text, so decoding accepts dashes, spaces and
/// mixed case; anything unrecognized is treated as an optimization opportunity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    CostLeak,
    ValueLeak,
    #[default]
    OptimizationOpportunity,
    Info,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::CostLeak => "cost_leak",
            RecommendationType::ValueLeak => "value_leak",
            RecommendationType::OptimizationOpportunity => "optimization_opportunity",
            RecommendationType::Info => "info",
        }
    }

    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "cost_leak" => RecommendationType::CostLeak,
            "value_leak" => RecommendationType::ValueLeak,
            "info" => RecommendationType::Info,
            _ => RecommendationType::OptimizationOpportunity,
        }
    }
}

impl<'de> Deserialize<'de> for RecommendationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(label)) => RecommendationType::from_label(&label),
            _ => RecommendationType::default(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "High", alias = "critical")]
    High,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(other)]
    None,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Risk {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
    #[default]
    #[serde(other)]
    None,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::High => "High",
            Risk::Medium => "Medium",
            Risk::Low => "Low",
            Risk::None => "None",
        }
    }
}

/// A single cost or value optimization finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: RecommendationType,
    #[serde(default, deserialize_with = "lenient")]
    pub severity: Severity,
    #[serde(default, deserialize_with = "text_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_config: Option<Value>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_savings: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub risk: Risk,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub implementation_steps: Option<Vec<String>>,
    /// ISO-8601, assigned during normalization when absent
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(
        default,
        deserialize_with = "number_or_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence_score: Option<f64>,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationType,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            kind,
            severity,
            title: title.into(),
            description: description.into(),
            resource_type: None,
            resource_id: None,
            current_config: None,
            recommended_config: None,
            estimated_savings: None,
            risk: Risk::None,
            implementation_steps: None,
            timestamp: None,
            confidence_score: None,
        }
    }

    pub fn for_resource(mut self, kind: ResourceKind, id: impl Into<ResourceId>) -> Self {
        self.resource_type = Some(kind.as_str().to_string());
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_current_config(mut self, config: Value) -> Self {
        self.current_config = Some(config);
        self
    }

    pub fn with_recommended_config(mut self, config: Value) -> Self {
        self.recommended_config = Some(config);
        self
    }

    pub fn with_savings(mut self, savings: impl Into<String>) -> Self {
        self.estimated_savings = Some(savings.into());
        self
    }

    pub fn with_risk(mut self, risk: Risk) -> Self {
        self.risk = risk;
        self
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implementation_steps = Some(steps.into_iter().map(Into::into).collect());
        self
    }
}

/// Which pass produced the stored recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisType {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "ai")]
    Ai,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::RuleBased => "rule-based",
            AnalysisType::Ai => "ai",
        }
    }
}

/// Outcome of one complete analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub recommendations: Vec<Recommendation>,
    pub resource_counts: ResourceCounts,
    pub timestamp: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    /// Whether a reasoning capability was configured for the run
    #[serde(default)]
    pub reasoning_available: bool,
}
