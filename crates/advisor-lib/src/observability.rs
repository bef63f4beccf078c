//! Observability for the advisor
//!
//! Prometheus metrics live in the global default registry so the HTTP layer
//! can expose them with `prometheus::gather()`. Significant lifecycle events
//! are logged through [`StructuredLogger`] with a stable `event` field.

use crate::models::AnalysisType;
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Gauge, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, info, warn};

/// Buckets for whole-run durations, in seconds
const ANALYSIS_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0];

static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

struct AdvisorMetricsInner {
    analysis_duration_seconds: Histogram,
    analysis_runs: IntCounterVec,
    analysis_failures: IntCounter,
    reasoning_fallbacks: IntCounterVec,
    fetch_errors: IntCounterVec,
    recommendations_current: IntGauge,
    last_analysis_timestamp: Gauge,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            analysis_duration_seconds: register_histogram!(
                "advisor_analysis_duration_seconds",
                "Wall-clock time of a complete analysis run",
                ANALYSIS_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_duration_seconds"),

            analysis_runs: register_int_counter_vec!(
                "advisor_analysis_runs_total",
                "Completed analysis runs by the pass that produced the result",
                &["analysis_type"]
            )
            .expect("Failed to register analysis_runs_total"),

            analysis_failures: register_int_counter!(
                "advisor_analysis_failures_total",
                "Analysis runs that ended without storing a result"
            )
            .expect("Failed to register analysis_failures_total"),

            reasoning_fallbacks: register_int_counter_vec!(
                "advisor_reasoning_fallbacks_total",
                "Runs where the rule-based result was kept instead of reasoning output",
                &["reason"]
            )
            .expect("Failed to register reasoning_fallbacks_total"),

            fetch_errors: register_int_counter_vec!(
                "advisor_fetch_errors_total",
                "Resource listings that failed or timed out",
                &["kind"]
            )
            .expect("Failed to register fetch_errors_total"),

            recommendations_current: register_int_gauge!(
                "advisor_recommendations_current",
                "Number of recommendations in the stored analysis"
            )
            .expect("Failed to register recommendations_current"),

            last_analysis_timestamp: register_gauge!(
                "advisor_last_analysis_timestamp_seconds",
                "Unix time of the last stored analysis"
            )
            .expect("Failed to register last_analysis_timestamp_seconds"),
        }
    }
}

/// Handle to the global advisor metrics; clones share the same series
#[derive(Clone)]
pub struct AdvisorMetrics {
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new)
    }

    pub fn observe_analysis_duration(&self, duration: Duration) {
        self.inner()
            .analysis_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Record a stored analysis
    pub fn record_analysis(&self, analysis_type: AnalysisType, recommendations: usize, timestamp: i64) {
        let inner = self.inner();
        inner
            .analysis_runs
            .with_label_values(&[analysis_type.as_str()])
            .inc();
        inner.recommendations_current.set(recommendations as i64);
        inner.last_analysis_timestamp.set(timestamp as f64);
    }

    pub fn inc_analysis_failures(&self) {
        self.inner().analysis_failures.inc();
    }

    pub fn inc_reasoning_fallback(&self, reason: &str) {
        self.inner()
            .reasoning_fallbacks
            .with_label_values(&[reason])
            .inc();
    }

    pub fn inc_fetch_error(&self, kind: &str) {
        self.inner().fetch_errors.with_label_values(&[kind]).inc();
    }
}

/// Structured logger for advisor lifecycle events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, source_configured: bool, reasoning_provider: Option<&str>) {
        info!(
            event = "advisor_started",
            instance = %self.instance,
            version = %version,
            source_configured = source_configured,
            reasoning_provider = reasoning_provider.unwrap_or("none"),
            "Compute advisor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "advisor_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Compute advisor shutting down"
        );
    }

    pub fn log_analysis_started(&self, run_id: &str, reasoning_available: bool) {
        info!(
            event = "analysis_started",
            instance = %self.instance,
            run_id = %run_id,
            reasoning_available = reasoning_available,
            "Analysis started"
        );
    }

    pub fn log_analysis_completed(
        &self,
        run_id: &str,
        analysis_type: AnalysisType,
        recommendations: usize,
        resources: usize,
        duration: Duration,
    ) {
        info!(
            event = "analysis_completed",
            instance = %self.instance,
            run_id = %run_id,
            analysis_type = analysis_type.as_str(),
            recommendations = recommendations,
            resources = resources,
            duration_ms = duration.as_millis() as u64,
            "Analysis completed"
        );
    }

    pub fn log_analysis_failed(&self, run_id: &str, reason: &str) {
        error!(
            event = "analysis_failed",
            instance = %self.instance,
            run_id = %run_id,
            reason = %reason,
            "Analysis failed, keeping previous result"
        );
    }

    pub fn log_reasoning_fallback(&self, run_id: &str, reason: &str, baseline: usize) {
        warn!(
            event = "reasoning_fallback",
            instance = %self.instance,
            run_id = %run_id,
            reason = %reason,
            baseline_recommendations = baseline,
            "Reasoning unavailable, using rule-based recommendations"
        );
    }

    pub fn log_fetch_failed(&self, kind: &str, error: &str) {
        warn!(
            event = "fetch_failed",
            instance = %self.instance,
            kind = %kind,
            error = %error,
            "Resource listing failed, continuing with empty list"
        );
    }
}
