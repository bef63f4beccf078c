//! Inventory collection
//!
//! Gathers every resource kind from a [`ResourceSource`] into one
//! [`ResourceInventory`]. Each listing is bounded by a timeout; a failure or
//! timeout degrades that kind to an empty list. ML jobs are picked out of the
//! job listing rather than listed again.

use super::ResourceSource;
use crate::error::SourceError;
use crate::models::{JobRun, ResourceInventory, ResourceKind};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Label used for run-history fetch failures
const JOB_RUNS_LABEL: &str = "job_run";

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Bound on each individual listing call
    pub fetch_timeout: Duration,
    /// Number of jobs (in listing order) whose run history is fetched
    pub job_run_sample_size: usize,
    /// Runs fetched per sampled job
    pub job_run_limit: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            job_run_sample_size: 10,
            job_run_limit: 10,
        }
    }
}

/// Fetches a complete inventory, converting per-kind failures into empty lists
#[derive(Clone)]
pub struct InventoryCollector {
    source: Arc<dyn ResourceSource>,
    config: InventoryConfig,
    metrics: AdvisorMetrics,
    logger: StructuredLogger,
}

impl InventoryCollector {
    pub fn new(
        source: Arc<dyn ResourceSource>,
        config: InventoryConfig,
        metrics: AdvisorMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            source,
            config,
            metrics,
            logger,
        }
    }

    /// Every listing plus run history for the leading jobs
    pub async fn collect(&self) -> ResourceInventory {
        let mut inventory = self.collect_listings().await;

        let sampled: Vec<i64> = inventory
            .jobs
            .iter()
            .take(self.config.job_run_sample_size)
            .map(|job| job.job_id)
            .collect();

        for job_id in sampled {
            let runs = self.job_runs(job_id, self.config.job_run_limit).await;
            if !runs.is_empty() {
                inventory.job_runs.insert(job_id, runs);
            }
        }

        debug!(
            resources = inventory.counts().total(),
            jobs_with_runs = inventory.job_runs.len(),
            "Inventory collected"
        );

        inventory
    }

    /// Every listing, without run history
    pub async fn collect_listings(&self) -> ResourceInventory {
        let mut inventory = ResourceInventory::default();
        for kind in ResourceKind::ALL {
            if kind != ResourceKind::MlJob {
                self.fill(&mut inventory, kind).await;
            }
        }
        inventory.ml_jobs = super::ml_jobs(&inventory.jobs);
        inventory
    }

    /// An inventory holding only the listing for `kind`
    pub async fn collect_kind(&self, kind: ResourceKind) -> ResourceInventory {
        let mut inventory = ResourceInventory::default();
        self.fill(&mut inventory, kind).await;
        inventory
    }

    /// Most recent runs of one job; empty when the fetch fails
    pub async fn job_runs(&self, job_id: i64, limit: usize) -> Vec<JobRun> {
        self.fetch(JOB_RUNS_LABEL, self.source.job_runs(job_id, limit))
            .await
    }

    async fn fill(&self, inventory: &mut ResourceInventory, kind: ResourceKind) {
        let source = self.source.as_ref();
        let label = kind.as_str();

        match kind {
            ResourceKind::Cluster => inventory.clusters = self.fetch(label, source.clusters()).await,
            ResourceKind::Job => inventory.jobs = self.fetch(label, source.jobs()).await,
            ResourceKind::SqlWarehouse => {
                inventory.sql_warehouses = self.fetch(label, source.sql_warehouses()).await
            }
            ResourceKind::Pool => inventory.pools = self.fetch(label, source.pools()).await,
            ResourceKind::VectorSearchEndpoint => {
                inventory.vector_search_endpoints =
                    self.fetch(label, source.vector_search_endpoints()).await
            }
            ResourceKind::Policy => inventory.policies = self.fetch(label, source.policies()).await,
            ResourceKind::App => inventory.apps = self.fetch(label, source.apps()).await,
            ResourceKind::ProvisionedStore => {
                inventory.provisioned_stores = self.fetch(label, source.provisioned_stores()).await
            }
            ResourceKind::MlJob => {
                let jobs = self.fetch(ResourceKind::Job.as_str(), source.jobs()).await;
                inventory.ml_jobs = super::ml_jobs(&jobs);
            }
            ResourceKind::ModelServingEndpoint => {
                inventory.model_serving_endpoints =
                    self.fetch(label, source.model_serving_endpoints()).await
            }
        }
    }

    async fn fetch<T, F>(&self, kind: &str, listing: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>, SourceError>>,
    {
        let error = match tokio::time::timeout(self.config.fetch_timeout, listing).await {
            Ok(Ok(items)) => return items,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", self.config.fetch_timeout),
        };

        self.logger.log_fetch_failed(kind, &error);
        self.metrics.inc_fetch_error(kind);
        Vec::new()
    }
}
