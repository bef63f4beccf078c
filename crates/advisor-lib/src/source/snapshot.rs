//! Source backed by a saved inventory snapshot
//!
//! Serves a previously collected [`ResourceInventory`] (for example one
//! exported as JSON) so analyses can run offline against a fixed picture of a
//! workspace.

use super::ResourceSource;
use crate::error::SourceError;
use crate::models::{
    App, Cluster, ClusterPolicy, InstancePool, Job, JobRun, ModelServingEndpoint,
    ProvisionedStore, ResourceInventory, SqlWarehouse, VectorSearchEndpoint,
};
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    inventory: ResourceInventory,
}

impl SnapshotSource {
    pub fn new(inventory: ResourceInventory) -> Self {
        Self { inventory }
    }

    /// Load a snapshot from a JSON file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::Decode(format!("{}: {}", path.display(), e)))?;
        let inventory = serde_json::from_str(&raw)
            .map_err(|e| SourceError::Decode(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(inventory))
    }
}

#[async_trait]
impl ResourceSource for SnapshotSource {
    async fn clusters(&self) -> Result<Vec<Cluster>, SourceError> {
        Ok(self.inventory.clusters.clone())
    }

    async fn jobs(&self) -> Result<Vec<Job>, SourceError> {
        Ok(self.inventory.jobs.clone())
    }

    async fn job_runs(&self, job_id: i64, limit: usize) -> Result<Vec<JobRun>, SourceError> {
        Ok(self
            .inventory
            .runs_for(job_id)
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn sql_warehouses(&self) -> Result<Vec<SqlWarehouse>, SourceError> {
        Ok(self.inventory.sql_warehouses.clone())
    }

    async fn pools(&self) -> Result<Vec<InstancePool>, SourceError> {
        Ok(self.inventory.pools.clone())
    }

    async fn vector_search_endpoints(&self) -> Result<Vec<VectorSearchEndpoint>, SourceError> {
        Ok(self.inventory.vector_search_endpoints.clone())
    }

    async fn policies(&self) -> Result<Vec<ClusterPolicy>, SourceError> {
        Ok(self.inventory.policies.clone())
    }

    async fn apps(&self) -> Result<Vec<App>, SourceError> {
        Ok(self.inventory.apps.clone())
    }

    async fn provisioned_stores(&self) -> Result<Vec<ProvisionedStore>, SourceError> {
        Ok(self.inventory.provisioned_stores.clone())
    }

    async fn model_serving_endpoints(&self) -> Result<Vec<ModelServingEndpoint>, SourceError> {
        Ok(self.inventory.model_serving_endpoints.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_snapshot_runs_with_limit() {
        let mut inventory = ResourceInventory::default();
        inventory.job_runs.insert(
            3,
            (0..5)
                .map(|run_id| JobRun {
                    run_id,
                    job_id: 3,
                    ..Default::default()
                })
                .collect(),
        );

        let source = SnapshotSource::new(inventory);

        assert_eq!(source.job_runs(3, 2).await.unwrap().len(), 2);
        assert!(source.job_runs(4, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_decode_error() {
        let err = SnapshotSource::from_file("/nonexistent/inventory.json")
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Decode(_)));
    }
}
