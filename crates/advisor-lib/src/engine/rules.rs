//! Deterministic rule-based analysis
//!
//! Always available and never fails. The output is the baseline that the
//! reasoning pass may replace, and it is never empty: when no rule fires a
//! single informational recommendation summarizes what was analyzed.

use crate::models::{
    Cluster, InstancePool, Job, ModelServingEndpoint, Recommendation, RecommendationType,
    Resource, ResourceInventory, ResourceKind, Risk, Severity, SqlWarehouse, STATE_RUNNING,
};
use serde_json::json;

/// Auto-termination suggested for running clusters, in minutes
pub const SUGGESTED_AUTOTERMINATION_MINUTES: u32 = 15;

/// Auto-stop suggested for running SQL warehouses, in minutes
pub const SUGGESTED_AUTO_STOP_MINUTES: u32 = 10;

/// Heuristic analyzer over a resource inventory
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply every rule; the returned list always has at least one entry
    pub fn analyze(&self, inventory: &ResourceInventory) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = inventory
            .resources()
            .filter_map(|resource| match resource {
                Resource::Cluster(cluster) => running_cluster_rule(cluster),
                Resource::Job(job) => empty_job_rule(job),
                Resource::SqlWarehouse(warehouse) => running_warehouse_rule(warehouse),
                Resource::Pool(pool) => unused_pool_rule(pool),
                Resource::MlJob(job) => ml_job_rule(job),
                Resource::ModelServingEndpoint(endpoint) => ready_endpoint_rule(endpoint),
                Resource::VectorSearchEndpoint(_)
                | Resource::Policy(_)
                | Resource::App(_)
                | Resource::ProvisionedStore(_) => None,
            })
            .collect();

        if recommendations.is_empty() {
            recommendations.push(analysis_complete(inventory));
        }

        recommendations
    }
}

fn running_cluster_rule(cluster: &Cluster) -> Option<Recommendation> {
    if cluster.state != STATE_RUNNING {
        return None;
    }

    let name = cluster.display_name();
    let rec = if cluster.num_workers > 0 {
        Recommendation::new(
            RecommendationType::CostLeak,
            Severity::Medium,
            format!("Running cluster: {}", name),
            format!(
                "Cluster is running with {} workers. Monitor for idle time and consider \
                 auto-termination if not actively used.",
                cluster.num_workers
            ),
        )
        .with_current_config(json!({
            "num_workers": cluster.num_workers,
            "node_type": cluster.node_type_id,
            "state": cluster.state,
            "autotermination_minutes": cluster.autotermination_minutes,
        }))
        .with_recommended_config(json!({
            "action": "Set auto-termination if cluster is idle for extended periods",
            "suggested_autotermination": SUGGESTED_AUTOTERMINATION_MINUTES,
        }))
        .with_savings("Medium - depends on idle time")
        .with_risk(Risk::Low)
        .with_steps([
            "Review recent cluster activity",
            "Enable auto-termination after 15 minutes of inactivity",
            "Monitor usage for one week",
        ])
    } else {
        Recommendation::new(
            RecommendationType::OptimizationOpportunity,
            Severity::Low,
            format!("Single-node cluster: {}", name),
            "Single-node cluster detected. Suitable for lightweight workloads.",
        )
        .with_current_config(json!({
            "num_workers": 0,
            "node_type": cluster.node_type_id,
        }))
        .with_recommended_config(json!({
            "action": "Continue using single-node for cost efficiency",
        }))
        .with_savings("Already optimized")
        .with_risk(Risk::None)
    };

    Some(rec.for_resource(ResourceKind::Cluster, cluster.cluster_id.as_str()))
}

fn empty_job_rule(job: &Job) -> Option<Recommendation> {
    if !job.tasks().is_empty() {
        return None;
    }

    Some(
        Recommendation::new(
            RecommendationType::OptimizationOpportunity,
            Severity::Low,
            format!("Job with no tasks: {}", job.display_name()),
            "Job has no configured tasks. Consider reviewing job configuration.",
        )
        .for_resource(ResourceKind::Job, job.job_id)
        .with_savings("N/A")
        .with_risk(Risk::Low),
    )
}

fn running_warehouse_rule(warehouse: &SqlWarehouse) -> Option<Recommendation> {
    if warehouse.state != STATE_RUNNING {
        return None;
    }

    Some(
        Recommendation::new(
            RecommendationType::CostLeak,
            Severity::Medium,
            format!("Running SQL Warehouse: {}", warehouse.display_name()),
            "SQL warehouse is running. Monitor usage and consider auto-stop if idle.",
        )
        .for_resource(ResourceKind::SqlWarehouse, warehouse.id.as_str())
        .with_current_config(json!({
            "state": warehouse.state,
            "cluster_size": warehouse.cluster_size,
            "auto_stop_mins": warehouse.auto_stop_mins,
        }))
        .with_recommended_config(json!({
            "action": "Enable auto-stop when idle",
            "suggested_auto_stop_mins": SUGGESTED_AUTO_STOP_MINUTES,
        }))
        .with_savings("Medium")
        .with_risk(Risk::Low),
    )
}

fn unused_pool_rule(pool: &InstancePool) -> Option<Recommendation> {
    if pool.active_instances() != 0 {
        return None;
    }

    Some(
        Recommendation::new(
            RecommendationType::CostLeak,
            Severity::Low,
            format!("Unused Instance Pool: {}", pool.display_name()),
            "Instance pool has no active instances. Consider reviewing pool configuration.",
        )
        .for_resource(ResourceKind::Pool, pool.instance_pool_id.as_str())
        .with_current_config(json!({
            "min_idle_instances": pool.min_idle_instances,
            "max_capacity": pool.max_capacity,
            "idle_instances": pool.stats.idle_count,
        }))
        .with_savings("Low")
        .with_risk(Risk::Low),
    )
}

fn ml_job_rule(job: &Job) -> Option<Recommendation> {
    Some(
        Recommendation::new(
            RecommendationType::OptimizationOpportunity,
            Severity::Low,
            format!("ML/AI Job detected: {}", job.display_name()),
            "ML/AI job identified. Monitor for resource optimization opportunities.",
        )
        .for_resource(ResourceKind::MlJob, job.job_id)
        .with_savings("Review needed")
        .with_risk(Risk::Low),
    )
}

fn ready_endpoint_rule(endpoint: &ModelServingEndpoint) -> Option<Recommendation> {
    if !endpoint.is_ready() {
        return None;
    }

    Some(
        Recommendation::new(
            RecommendationType::CostLeak,
            Severity::Medium,
            format!("Active Model Serving Endpoint: {}", endpoint.name),
            "Model serving endpoint is active. Monitor usage and costs.",
        )
        .for_resource(ResourceKind::ModelServingEndpoint, endpoint.name.as_str())
        .with_savings("Medium")
        .with_risk(Risk::Low),
    )
}

fn analysis_complete(inventory: &ResourceInventory) -> Recommendation {
    Recommendation::new(
        RecommendationType::Info,
        Severity::Low,
        "Analysis Complete",
        format!(
            "Analyzed {} jobs and {} clusters. No immediate optimization opportunities detected.",
            inventory.jobs.len(),
            inventory.clusters.len()
        ),
    )
    .with_savings("Continue monitoring")
    .with_risk(Risk::None)
}
