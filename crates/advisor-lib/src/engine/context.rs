//! Analysis context construction
//!
//! Condenses a resource inventory into the compact per-kind summaries that the
//! reasoning prompt embeds. Only running clusters are kept; everything else is
//! summarized as-is.

use crate::models::{
    Cluster, Job, JobRun, ResourceCounts, ResourceInventory, STATE_RUNNING,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Clusters scoring strictly below this are flagged idle
pub const IDLE_THRESHOLD: f64 = 0.2;

/// Score the placeholder scorer gives any cluster with workers
pub const PLACEHOLDER_BUSY_SCORE: f64 = 0.5;

/// Estimates how busy a cluster is, in the range 0.0-1.0
pub trait UtilizationScorer: Send + Sync {
    fn score(&self, cluster: &Cluster) -> f64;
}

/// Stand-in for telemetry-based scoring: a fixed score when the cluster has
/// workers, zero otherwise
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderScorer {
    pub busy_score: f64,
}

impl Default for PlaceholderScorer {
    fn default() -> Self {
        Self {
            busy_score: PLACEHOLDER_BUSY_SCORE,
        }
    }
}

impl UtilizationScorer for PlaceholderScorer {
    fn score(&self, cluster: &Cluster) -> f64 {
        if cluster.num_workers == 0 {
            0.0
        } else {
            self.busy_score
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub cluster_name: String,
    pub num_workers: u32,
    pub node_type: Option<String>,
    pub autotermination_minutes: Option<u32>,
    pub cluster_source: String,
    pub utilization_score: f64,
    pub is_idle: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: i64,
    pub job_name: String,
    pub num_tasks: usize,
    pub avg_duration_seconds: Option<f64>,
    pub cluster_config: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseSummary {
    pub id: String,
    pub name: String,
    pub state: String,
    pub cluster_size: Option<String>,
    pub warehouse_type: Option<String>,
    pub auto_stop_mins: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub instance_pool_id: String,
    pub instance_pool_name: String,
    pub node_type_id: Option<String>,
    pub min_idle_instances: u32,
    pub max_capacity: Option<u32>,
    pub active_instances: u32,
    pub idle_instances: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointSummary {
    pub endpoint_id: Option<String>,
    pub endpoint_name: String,
    pub status: Option<String>,
    pub num_indexes: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub policy_id: String,
    pub name: Option<String>,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    pub name: String,
    pub status: Option<String>,
    pub compute_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub state: Option<String>,
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServingSummary {
    pub name: String,
    pub ready: bool,
    pub config_update: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    #[serde(flatten)]
    pub counts: ResourceCounts,
    pub running_clusters: usize,
    /// Running clusters scoring below [`IDLE_THRESHOLD`]
    pub idle_clusters: usize,
}

/// Per-kind summaries handed to the reasoning pass
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisContext {
    pub clusters: Vec<ClusterSummary>,
    pub jobs: Vec<JobSummary>,
    pub sql_warehouses: Vec<WarehouseSummary>,
    pub pools: Vec<PoolSummary>,
    pub vector_search_endpoints: Vec<EndpointSummary>,
    pub policies: Vec<PolicySummary>,
    pub apps: Vec<AppSummary>,
    pub provisioned_stores: Vec<StoreSummary>,
    pub ml_jobs: Vec<JobSummary>,
    pub model_serving_endpoints: Vec<ServingSummary>,
    pub summary: ContextSummary,
}

/// Builds an [`AnalysisContext`] from a resource inventory
#[derive(Clone)]
pub struct ContextBuilder {
    scorer: Arc<dyn UtilizationScorer>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(Arc::new(PlaceholderScorer::default()))
    }
}

impl ContextBuilder {
    pub fn new(scorer: Arc<dyn UtilizationScorer>) -> Self {
        Self { scorer }
    }

    pub fn build(&self, inventory: &ResourceInventory) -> AnalysisContext {
        let clusters: Vec<ClusterSummary> = inventory
            .clusters
            .iter()
            .filter(|c| c.state == STATE_RUNNING)
            .map(|c| self.summarize_cluster(c))
            .collect();

        AnalysisContext {
            summary: ContextSummary {
                counts: inventory.counts(),
                running_clusters: clusters.len(),
                idle_clusters: clusters.iter().filter(|c| c.is_idle).count(),
            },
            clusters,
            jobs: inventory
                .jobs
                .iter()
                .map(|j| summarize_job(j, inventory.runs_for(j.job_id)))
                .collect(),
            sql_warehouses: inventory
                .sql_warehouses
                .iter()
                .map(|w| WarehouseSummary {
                    id: w.id.clone(),
                    name: w.display_name(),
                    state: w.state.clone(),
                    cluster_size: w.cluster_size.clone(),
                    warehouse_type: w.warehouse_type.clone(),
                    auto_stop_mins: w.auto_stop_mins,
                })
                .collect(),
            pools: inventory
                .pools
                .iter()
                .map(|p| PoolSummary {
                    instance_pool_id: p.instance_pool_id.clone(),
                    instance_pool_name: p.display_name(),
                    node_type_id: p.node_type_id.clone(),
                    min_idle_instances: p.min_idle_instances,
                    max_capacity: p.max_capacity,
                    active_instances: p.active_instances(),
                    idle_instances: p.stats.idle_count,
                })
                .collect(),
            vector_search_endpoints: inventory
                .vector_search_endpoints
                .iter()
                .map(|e| EndpointSummary {
                    endpoint_id: e.id.clone(),
                    endpoint_name: e.name.clone(),
                    status: e.endpoint_status.as_ref().and_then(|s| s.state.clone()),
                    num_indexes: e.num_indexes,
                })
                .collect(),
            policies: inventory
                .policies
                .iter()
                .map(|p| PolicySummary {
                    policy_id: p.policy_id.clone(),
                    name: p.name.clone(),
                    definition: p.definition.clone(),
                })
                .collect(),
            apps: inventory
                .apps
                .iter()
                .map(|a| AppSummary {
                    name: a.name.clone(),
                    status: a.app_status.as_ref().and_then(|s| s.state.clone()),
                    compute_status: a.compute_status.as_ref().and_then(|s| s.state.clone()),
                })
                .collect(),
            provisioned_stores: inventory
                .provisioned_stores
                .iter()
                .map(|s| StoreSummary {
                    name: s.name.clone(),
                    state: s.state.clone(),
                    capacity: s.capacity.clone(),
                })
                .collect(),
            ml_jobs: inventory
                .ml_jobs
                .iter()
                .map(|j| summarize_job(j, inventory.runs_for(j.job_id)))
                .collect(),
            model_serving_endpoints: inventory
                .model_serving_endpoints
                .iter()
                .map(|e| ServingSummary {
                    name: e.name.clone(),
                    ready: e.is_ready(),
                    config_update: e.state.as_ref().and_then(|s| s.config_update.clone()),
                })
                .collect(),
        }
    }

    fn summarize_cluster(&self, cluster: &Cluster) -> ClusterSummary {
        let utilization_score = self.scorer.score(cluster);
        ClusterSummary {
            cluster_id: cluster.cluster_id.clone(),
            cluster_name: cluster.display_name(),
            num_workers: cluster.num_workers,
            node_type: cluster.node_type_id.clone(),
            autotermination_minutes: cluster.autotermination_minutes,
            cluster_source: cluster
                .cluster_source
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            utilization_score,
            is_idle: utilization_score < IDLE_THRESHOLD,
        }
    }
}

fn summarize_job(job: &Job, runs: &[JobRun]) -> JobSummary {
    JobSummary {
        job_id: job.job_id,
        job_name: job.display_name(),
        num_tasks: job.tasks().len(),
        avg_duration_seconds: average_run_duration(runs),
        cluster_config: representative_cluster_config(job),
    }
}

/// Mean duration in seconds over runs with both a start and an end time
pub fn average_run_duration(runs: &[JobRun]) -> Option<f64> {
    let durations: Vec<f64> = runs.iter().filter_map(JobRun::duration_seconds).collect();
    if durations.is_empty() {
        return None;
    }
    Some(durations.iter().sum::<f64>() / durations.len() as f64)
}

/// Cluster configuration of the job's first task
pub fn representative_cluster_config(job: &Job) -> Option<Value> {
    let first = job.tasks().first()?;
    if let Some(new_cluster) = &first.new_cluster {
        return Some(new_cluster.clone());
    }
    first
        .existing_cluster_id
        .as_ref()
        .map(|id| json!({ "cluster_id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobSettings, JobTask};

    struct FixedScorer(f64);

    impl UtilizationScorer for FixedScorer {
        fn score(&self, _cluster: &Cluster) -> f64 {
            self.0
        }
    }

    fn running_cluster(id: &str, workers: u32) -> Cluster {
        Cluster {
            cluster_id: id.to_string(),
            cluster_name: Some(format!("{}-name", id)),
            state: STATE_RUNNING.to_string(),
            num_workers: workers,
            ..Default::default()
        }
    }

    fn job_with_tasks(job_id: i64, tasks: Vec<JobTask>) -> Job {
        Job {
            job_id,
            settings: JobSettings {
                name: Some(format!("job-{}", job_id)),
                tasks,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_workers_scores_zero_and_idle() {
        let inventory = ResourceInventory {
            clusters: vec![running_cluster("c-1", 0)],
            ..Default::default()
        };

        let context = ContextBuilder::default().build(&inventory);

        assert_eq!(context.clusters[0].utilization_score, 0.0);
        assert!(context.clusters[0].is_idle);
    }

    #[test]
    fn test_placeholder_score_with_workers() {
        let inventory = ResourceInventory {
            clusters: vec![running_cluster("c-1", 4)],
            ..Default::default()
        };

        let context = ContextBuilder::default().build(&inventory);

        assert_eq!(context.clusters[0].utilization_score, PLACEHOLDER_BUSY_SCORE);
        assert!(!context.clusters[0].is_idle);
    }

    #[test]
    fn test_idle_threshold_is_strict() {
        let inventory = ResourceInventory {
            clusters: vec![running_cluster("c-1", 2)],
            ..Default::default()
        };

        let at_threshold = ContextBuilder::new(Arc::new(FixedScorer(0.2))).build(&inventory);
        assert!(!at_threshold.clusters[0].is_idle);

        let below = ContextBuilder::new(Arc::new(FixedScorer(0.19))).build(&inventory);
        assert!(below.clusters[0].is_idle);
    }

    #[test]
    fn test_only_running_clusters_kept() {
        let mut stopped = running_cluster("c-2", 3);
        stopped.state = "TERMINATED".to_string();
        let inventory = ResourceInventory {
            clusters: vec![running_cluster("c-1", 1), stopped],
            ..Default::default()
        };

        let context = ContextBuilder::default().build(&inventory);

        assert_eq!(context.clusters.len(), 1);
        assert_eq!(context.summary.counts.clusters, 2);
        assert_eq!(context.summary.running_clusters, 1);
    }

    #[test]
    fn test_idle_clusters_counted_among_running() {
        let mut stopped = running_cluster("c-3", 0);
        stopped.state = "TERMINATED".to_string();
        let inventory = ResourceInventory {
            clusters: vec![running_cluster("c-1", 0), running_cluster("c-2", 4), stopped],
            ..Default::default()
        };

        let context = ContextBuilder::default().build(&inventory);

        assert_eq!(context.summary.running_clusters, 2);
        assert_eq!(context.summary.idle_clusters, 1);
    }

    #[test]
    fn test_average_duration_skips_incomplete_runs() {
        let runs = vec![
            JobRun {
                start_time: Some(1_000),
                end_time: Some(11_000),
                ..Default::default()
            },
            JobRun {
                start_time: Some(1_000),
                end_time: Some(31_000),
                ..Default::default()
            },
            JobRun {
                start_time: Some(5_000),
                end_time: None,
                ..Default::default()
            },
        ];

        assert_eq!(average_run_duration(&runs), Some(20.0));
        assert_eq!(average_run_duration(&runs[2..]), None);
        assert_eq!(average_run_duration(&[]), None);
    }

    #[test]
    fn test_job_summary_uses_run_history() {
        let mut inventory = ResourceInventory {
            jobs: vec![job_with_tasks(7, vec![JobTask::default()])],
            ..Default::default()
        };
        inventory.job_runs.insert(
            7,
            vec![JobRun {
                job_id: 7,
                start_time: Some(1_000),
                end_time: Some(121_000),
                ..Default::default()
            }],
        );

        let context = ContextBuilder::default().build(&inventory);

        assert_eq!(context.jobs[0].num_tasks, 1);
        assert_eq!(context.jobs[0].avg_duration_seconds, Some(120.0));
    }

    #[test]
    fn test_representative_cluster_config() {
        let with_new = job_with_tasks(
            1,
            vec![JobTask {
                new_cluster: Some(json!({"num_workers": 8})),
                ..Default::default()
            }],
        );
        let with_existing = job_with_tasks(
            2,
            vec![JobTask {
                existing_cluster_id: Some("c-5".to_string()),
                ..Default::default()
            }],
        );
        let empty = job_with_tasks(3, vec![]);

        assert_eq!(
            representative_cluster_config(&with_new),
            Some(json!({"num_workers": 8}))
        );
        assert_eq!(
            representative_cluster_config(&with_existing),
            Some(json!({"cluster_id": "c-5"}))
        );
        assert_eq!(representative_cluster_config(&empty), None);
    }

    #[test]
    fn test_summary_serializes_flat_counts() {
        let context = ContextBuilder::default().build(&ResourceInventory::default());
        let value = serde_json::to_value(&context).unwrap();

        assert_eq!(value["summary"]["clusters"], 0);
        assert_eq!(value["summary"]["running_clusters"], 0);
        assert_eq!(value["summary"]["idle_clusters"], 0);
    }
}
