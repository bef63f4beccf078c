//! Analysis service
//!
//! The surface shared by the HTTP layer: trigger an analysis, read the cached
//! result, and derive summary metrics. Runs are serialized by a mutex so only
//! one analysis writes to the store at a time; reads never wait on a run.

use crate::engine::{
    AnalysisEngine, ContextBuilder, ContextSummary, PlaceholderScorer, RunStamp, UtilizationScorer,
};
use crate::error::AdvisorError;
use crate::health::{components, HealthRegistry};
use crate::models::{
    AnalysisResult, AnalysisType, JobRun, Recommendation, ResourceCounts, ResourceInventory,
    ResourceKind,
};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use crate::reasoning::{ReasoningAdapter, ReasoningCapability, REASONING_TIMEOUT};
use crate::source::{InventoryCollector, InventoryConfig, ResourceSource};
use crate::store::AnalysisStore;
use crate::summary::SummaryMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default bound on a whole analysis run
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(600);

/// Message returned when no analysis has been stored yet
pub const NO_ANALYSIS_MESSAGE: &str = "No analysis available. Please run analysis first.";

/// Cached analysis as served to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub has_analysis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<AnalysisType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_counts: Option<ResourceCounts>,
    #[serde(default)]
    pub reasoning_available: bool,
}

impl CachedAnalysis {
    fn absent() -> Self {
        Self {
            has_analysis: false,
            message: Some(NO_ANALYSIS_MESSAGE.to_string()),
            recommendations: Vec::new(),
            analysis_type: None,
            timestamp: None,
            resource_counts: None,
            reasoning_available: false,
        }
    }

    fn from_result(result: &AnalysisResult) -> Self {
        Self {
            has_analysis: true,
            message: None,
            recommendations: result.recommendations.clone(),
            analysis_type: Some(result.analysis_type),
            timestamp: Some(result.timestamp),
            resource_counts: Some(result.resource_counts),
            reasoning_available: result.reasoning_available,
        }
    }
}

/// Short description of a completed run, returned alongside its recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub resource_counts: ResourceCounts,
    pub total_resources: usize,
    pub recommendation_count: usize,
    pub timestamp: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    pub reasoning_available: bool,
}

impl RunReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            resource_counts: result.resource_counts,
            total_resources: result.resource_counts.total(),
            recommendation_count: result.recommendations.len(),
            timestamp: result.timestamp,
            analysis_type: result.analysis_type,
            reasoning_available: result.reasoning_available,
        }
    }
}

/// Live resource counts for the workspace, independent of any stored analysis
#[derive(Debug, Clone, Serialize)]
pub struct InventoryStats {
    #[serde(flatten)]
    pub summary: ContextSummary,
    pub timestamp: DateTime<Utc>,
}

/// Runs analyses and serves their results
pub struct AnalysisService {
    collector: Option<InventoryCollector>,
    engine: AnalysisEngine,
    store: AnalysisStore,
    run_lock: Mutex<()>,
    analysis_timeout: Duration,
    health: HealthRegistry,
    metrics: AdvisorMetrics,
    logger: StructuredLogger,
}

impl AnalysisService {
    pub fn builder() -> AnalysisServiceBuilder {
        AnalysisServiceBuilder::new()
    }

    pub fn source_configured(&self) -> bool {
        self.collector.is_some()
    }

    pub fn reasoning_configured(&self) -> bool {
        self.engine.reasoning_available()
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    /// Collect, analyze and store; the store is untouched on failure
    pub async fn analyze_now(&self) -> Result<AnalysisResult, AdvisorError> {
        let _guard = self.run_lock.lock().await;
        let stamp = RunStamp::now();

        let Some(collector) = self.collector.as_ref() else {
            let err = AdvisorError::SourceNotConfigured;
            self.metrics.inc_analysis_failures();
            self.logger.log_analysis_failed(&stamp.run_id, &err.to_string());
            return Err(err);
        };

        self.logger
            .log_analysis_started(&stamp.run_id, self.reasoning_configured());
        let started = Instant::now();

        let run = tokio::time::timeout(self.analysis_timeout, async {
            let inventory = collector.collect().await;
            self.engine.run(&inventory, &stamp).await
        })
        .await;

        let run = match run {
            Ok(run) => run,
            Err(_) => {
                let err = AdvisorError::AnalysisTimeout(self.analysis_timeout);
                self.metrics.inc_analysis_failures();
                self.logger.log_analysis_failed(&stamp.run_id, &err.to_string());
                return Err(err);
            }
        };

        match run.fallback_reason.as_deref() {
            Some(reason) => {
                self.metrics.inc_reasoning_fallback(reason);
                self.logger.log_reasoning_fallback(
                    &stamp.run_id,
                    reason,
                    run.result.recommendations.len(),
                );
                self.health
                    .set_degraded(
                        components::REASONING,
                        format!("Last run fell back to rule-based analysis ({})", reason),
                    )
                    .await;
            }
            None if run.result.analysis_type == AnalysisType::Ai => {
                self.health.set_healthy(components::REASONING).await;
            }
            None => {}
        }

        let result = run.result;
        self.store.write(result.clone()).await;
        self.health.set_healthy(components::ANALYSIS_STORE).await;

        let elapsed = started.elapsed();
        self.metrics.observe_analysis_duration(elapsed);
        self.metrics.record_analysis(
            result.analysis_type,
            result.recommendations.len(),
            result.timestamp.timestamp(),
        );
        self.logger.log_analysis_completed(
            &stamp.run_id,
            result.analysis_type,
            result.recommendations.len(),
            result.resource_counts.total(),
            elapsed,
        );

        Ok(result)
    }

    fn collector(&self) -> Result<&InventoryCollector, AdvisorError> {
        self.collector
            .as_ref()
            .ok_or(AdvisorError::SourceNotConfigured)
    }

    /// Every current listing, without run history
    pub async fn inventory(&self) -> Result<ResourceInventory, AdvisorError> {
        Ok(self.collector()?.collect_listings().await)
    }

    /// Current listing of one resource kind
    pub async fn listing(&self, kind: ResourceKind) -> Result<ResourceInventory, AdvisorError> {
        Ok(self.collector()?.collect_kind(kind).await)
    }

    pub async fn job_runs(&self, job_id: i64, limit: usize) -> Result<Vec<JobRun>, AdvisorError> {
        Ok(self.collector()?.job_runs(job_id, limit).await)
    }

    /// Per-kind counts plus running and idle clusters, from fresh listings
    pub async fn stats(&self) -> Result<InventoryStats, AdvisorError> {
        let inventory = self.inventory().await?;
        Ok(InventoryStats {
            summary: self.engine.context(&inventory).summary,
            timestamp: Utc::now(),
        })
    }

    /// Latest stored analysis, or an explanatory placeholder
    pub async fn current(&self) -> CachedAnalysis {
        match self.store.read().await {
            Some(stored) => CachedAnalysis::from_result(&stored.result),
            None => CachedAnalysis::absent(),
        }
    }

    pub async fn summary(&self) -> SummaryMetrics {
        match self.store.read().await {
            Some(stored) => SummaryMetrics::from_stored(&stored),
            None => SummaryMetrics::empty(),
        }
    }
}

/// Builder for [`AnalysisService`]
pub struct AnalysisServiceBuilder {
    source: Option<Arc<dyn ResourceSource>>,
    reasoning: Option<Arc<dyn ReasoningCapability>>,
    scorer: Arc<dyn UtilizationScorer>,
    inventory: InventoryConfig,
    reasoning_timeout: Duration,
    analysis_timeout: Duration,
    store: AnalysisStore,
    health: HealthRegistry,
    metrics: Option<AdvisorMetrics>,
    instance: String,
}

impl AnalysisServiceBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            reasoning: None,
            scorer: Arc::new(PlaceholderScorer::default()),
            inventory: InventoryConfig::default(),
            reasoning_timeout: REASONING_TIMEOUT,
            analysis_timeout: ANALYSIS_TIMEOUT,
            store: AnalysisStore::new(),
            health: HealthRegistry::new(),
            metrics: None,
            instance: "compute-advisor".to_string(),
        }
    }

    pub fn source(mut self, source: Arc<dyn ResourceSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn reasoning(mut self, reasoning: Arc<dyn ReasoningCapability>) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn UtilizationScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn inventory_config(mut self, config: InventoryConfig) -> Self {
        self.inventory = config;
        self
    }

    pub fn reasoning_timeout(mut self, timeout: Duration) -> Self {
        self.reasoning_timeout = timeout;
        self
    }

    pub fn analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn store(mut self, store: AnalysisStore) -> Self {
        self.store = store;
        self
    }

    pub fn health_registry(mut self, health: HealthRegistry) -> Self {
        self.health = health;
        self
    }

    pub fn metrics(mut self, metrics: AdvisorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// Assemble the service and register its components for health reporting
    pub async fn build(self) -> AnalysisService {
        let metrics = self.metrics.unwrap_or_default();
        let logger = StructuredLogger::new(self.instance);

        self.health
            .register_advisor(self.source.is_some(), self.reasoning.is_some())
            .await;

        let collector = self.source.map(|source| {
            InventoryCollector::new(source, self.inventory, metrics.clone(), logger.clone())
        });
        let adapter = self
            .reasoning
            .map(|capability| ReasoningAdapter::with_timeout(capability, self.reasoning_timeout));
        let engine = AnalysisEngine::new(ContextBuilder::new(self.scorer), adapter);

        AnalysisService {
            collector,
            engine,
            store: self.store,
            run_lock: Mutex::new(()),
            analysis_timeout: self.analysis_timeout,
            health: self.health,
            metrics,
            logger,
        }
    }
}

impl Default for AnalysisServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
