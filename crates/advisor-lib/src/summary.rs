//! Summary metrics over a stored analysis
//!
//! Savings figures are free-form text. The first decimal number found in the
//! text is taken as a monthly amount in dollars. When the text contains a `%`
//! the number is multiplied by 100, so "30% reduction" counts as $3,000. That
//! conversion is a rough heuristic kept for compatibility with existing
//! dashboards; it is not a real percentage-of-spend calculation.

use crate::models::{AnalysisType, Recommendation, RecommendationType, ResourceCounts, Severity};
use crate::store::StoredAnalysis;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

const TRACKED_TYPES: [RecommendationType; 3] = [
    RecommendationType::CostLeak,
    RecommendationType::ValueLeak,
    RecommendationType::OptimizationOpportunity,
];

const TRACKED_SEVERITIES: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

const UNKNOWN_RESOURCE_TYPE: &str = "unknown";

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.?\d*").expect("valid savings pattern"))
}

/// Dollar amount implied by a savings string; 0.0 when none can be found
pub fn parse_savings(text: &str) -> f64 {
    let Some(found) = number_pattern().find(text) else {
        return 0.0;
    };
    let value: f64 = found.as_str().parse().unwrap_or(0.0);
    if text.contains('%') {
        value * 100.0
    } else {
        value
    }
}

/// Format a dollar amount as "$1,234.56"
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub timestamp: Option<DateTime<Utc>>,
    pub analysis_type: Option<AnalysisType>,
    pub jobs_analyzed: usize,
    pub clusters_analyzed: usize,
    pub resource_counts: ResourceCounts,
    pub has_analysis: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessMetrics {
    pub recommendations_generated: usize,
    pub high_priority_actions: usize,
    pub potential_monthly_savings: f64,
    pub optimization_coverage: String,
}

/// Aggregate figures derived from the stored recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_cost_savings: f64,
    pub total_cost_savings_formatted: String,
    pub total_recommendations: usize,
    pub jobs_identified: usize,
    pub resources_optimized: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub savings_by_type: BTreeMap<String, f64>,
    pub resources_by_type: BTreeMap<String, usize>,
    pub analysis_metadata: AnalysisMetadata,
    pub success_metrics: SuccessMetrics,
}

impl SummaryMetrics {
    /// Summary with every figure at zero, used before the first analysis
    pub fn empty() -> Self {
        Self::from_recommendations(&[], AnalysisMetadata::default())
    }

    pub fn from_stored(stored: &StoredAnalysis) -> Self {
        let result = &stored.result;
        let metadata = AnalysisMetadata {
            timestamp: Some(result.timestamp),
            analysis_type: Some(result.analysis_type),
            jobs_analyzed: result.resource_counts.jobs,
            clusters_analyzed: result.resource_counts.clusters,
            resource_counts: result.resource_counts,
            has_analysis: !result.recommendations.is_empty(),
        };
        Self::from_recommendations(&result.recommendations, metadata)
    }

    pub fn from_recommendations(recommendations: &[Recommendation], metadata: AnalysisMetadata) -> Self {
        let mut by_type: BTreeMap<String, usize> = TRACKED_TYPES
            .iter()
            .map(|t| (t.as_str().to_string(), 0))
            .collect();
        let mut by_severity: BTreeMap<String, usize> = TRACKED_SEVERITIES
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut savings_by_type: BTreeMap<String, f64> = TRACKED_TYPES
            .iter()
            .map(|t| (t.as_str().to_string(), 0.0))
            .collect();
        let mut resources: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut job_ids: BTreeSet<String> = BTreeSet::new();
        let mut total_savings = 0.0;

        for rec in recommendations {
            let kind = rec.kind.as_str();
            if let Some(count) = by_type.get_mut(kind) {
                *count += 1;
            }
            if let Some(count) = by_severity.get_mut(rec.severity.as_str()) {
                *count += 1;
            }

            let savings = rec.estimated_savings.as_deref().map(parse_savings).unwrap_or(0.0);
            total_savings += savings;
            if let Some(sum) = savings_by_type.get_mut(kind) {
                *sum += savings;
            }

            let resource_type = rec
                .resource_type
                .as_deref()
                .unwrap_or(UNKNOWN_RESOURCE_TYPE);
            let ids = resources.entry(resource_type.to_string()).or_default();
            if let Some(id) = &rec.resource_id {
                ids.insert(id.to_string());
                if resource_type == "job" {
                    job_ids.insert(id.to_string());
                }
            }
        }

        let resources_by_type: BTreeMap<String, usize> = resources
            .into_iter()
            .map(|(resource_type, ids)| (resource_type, ids.len()))
            .collect();
        let resources_optimized: usize = resources_by_type.values().sum();
        let total = round2(total_savings);
        let high_priority_actions = by_severity.get("high").copied().unwrap_or(0);

        Self {
            total_cost_savings: total,
            total_cost_savings_formatted: format_currency(total_savings),
            total_recommendations: recommendations.len(),
            jobs_identified: job_ids.len(),
            resources_optimized,
            savings_by_type: savings_by_type
                .into_iter()
                .map(|(k, v)| (k, round2(v)))
                .collect(),
            by_type,
            by_severity,
            resources_by_type,
            analysis_metadata: metadata,
            success_metrics: SuccessMetrics {
                recommendations_generated: recommendations.len(),
                high_priority_actions,
                potential_monthly_savings: total,
                optimization_coverage: format!(
                    "{} jobs, {} resources",
                    job_ids.len(),
                    resources_optimized
                ),
            },
        }
    }
}
