//! Analysis engine
//!
//! Turns a resource inventory into a normalized [`AnalysisResult`](crate::models::AnalysisResult):
//! the rule-based pass always runs, and an optional reasoning pass replaces
//! its output only when it produces recommendations.

mod context;
mod normalizer;
mod pipeline;
mod rules;

pub use context::{
    average_run_duration, representative_cluster_config, AnalysisContext, AppSummary,
    ClusterSummary, ContextBuilder, ContextSummary, EndpointSummary, JobSummary,
    PlaceholderScorer, PolicySummary, PoolSummary, ServingSummary, StoreSummary,
    UtilizationScorer, WarehouseSummary, IDLE_THRESHOLD, PLACEHOLDER_BUSY_SCORE,
};
pub use normalizer::{normalize, RunStamp, DEFAULT_CONFIDENCE};
pub use pipeline::{AnalysisEngine, EngineRun};
pub use rules::RuleEngine;
