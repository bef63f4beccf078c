//! Resource sources
//!
//! A source lists the compute resources of one workspace. Listings are
//! independent: the [`InventoryCollector`] fetches each kind separately and a
//! failure in one never hides the others.

mod inventory;
mod snapshot;
mod workspace;

#[cfg(test)]
mod tests;

pub use inventory::{InventoryCollector, InventoryConfig};
pub use snapshot::SnapshotSource;
pub use workspace::{WorkspaceConfig, WorkspaceSource};

use crate::error::SourceError;
use crate::models::{
    App, Cluster, ClusterPolicy, InstancePool, Job, JobRun, ModelServingEndpoint,
    ProvisionedStore, SqlWarehouse, VectorSearchEndpoint,
};
use async_trait::async_trait;

/// Read access to the resources of a workspace
#[async_trait]
pub trait ResourceSource: Send + Sync {
    async fn clusters(&self) -> Result<Vec<Cluster>, SourceError>;

    async fn jobs(&self) -> Result<Vec<Job>, SourceError>;

    /// Most recent runs of one job, newest first
    async fn job_runs(&self, job_id: i64, limit: usize) -> Result<Vec<JobRun>, SourceError>;

    async fn sql_warehouses(&self) -> Result<Vec<SqlWarehouse>, SourceError>;

    async fn pools(&self) -> Result<Vec<InstancePool>, SourceError>;

    async fn vector_search_endpoints(&self) -> Result<Vec<VectorSearchEndpoint>, SourceError>;

    async fn policies(&self) -> Result<Vec<ClusterPolicy>, SourceError>;

    async fn apps(&self) -> Result<Vec<App>, SourceError>;

    async fn provisioned_stores(&self) -> Result<Vec<ProvisionedStore>, SourceError>;

    async fn model_serving_endpoints(&self) -> Result<Vec<ModelServingEndpoint>, SourceError>;
}

/// Jobs from an existing listing whose clusters run an ML runtime
pub fn ml_jobs(jobs: &[Job]) -> Vec<Job> {
    jobs.iter().filter(|job| is_ml_job(job)).cloned().collect()
}

/// Whether a job's cluster runs an ML runtime
pub fn is_ml_job(job: &Job) -> bool {
    job.tasks().iter().any(|task| {
        task.new_cluster
            .as_ref()
            .and_then(|c| c.get("spark_version"))
            .and_then(|v| v.as_str())
            .map(|v| v.to_ascii_lowercase().contains("ml"))
            .unwrap_or(false)
    })
}
