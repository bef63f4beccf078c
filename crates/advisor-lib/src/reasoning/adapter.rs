//! Prompt construction and response decoding for the reasoning pass

use super::{ReasoningCapability, ReasoningOutcome};
use crate::engine::AnalysisContext;
use crate::error::ReasoningError;
use crate::models::Recommendation;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single reasoning call
pub const REASONING_TIMEOUT: Duration = Duration::from_secs(120);

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

const OUTPUT_SCHEMA: &str = r#"For each issue found, provide:
- type: "cost_leak", "value_leak", "optimization_opportunity", or "info"
- severity: "high", "medium", "low", or "none"
- title: Clear, actionable title
- description: Detailed explanation of the issue
- resource_type: "cluster", "job", "sql_warehouse", "pool", "vector_search_endpoint", "policy", "app", "provisioned_store", "ml_job", or "model_serving_endpoint"
- resource_id: The specific resource ID
- current_config: Current configuration details
- recommended_config: Recommended changes
- estimated_savings: Estimated monthly cost savings (e.g., "$500/month" or "30% reduction")
- risk: "High", "Medium", "Low", or "None"
- implementation_steps: Array of actionable steps

Return ONLY a valid JSON array of recommendations. Example format:
[
  {
    "type": "cost_leak",
    "severity": "high",
    "title": "Idle SQL Warehouse detected",
    "description": "SQL warehouse has been running for 24+ hours with no active queries",
    "resource_type": "sql_warehouse",
    "resource_id": "warehouse-123",
    "current_config": {"state": "RUNNING", "cluster_size": "Large"},
    "recommended_config": {"action": "Enable auto-stop after 10 minutes of inactivity"},
    "estimated_savings": "$800/month",
    "risk": "Low",
    "implementation_steps": ["Enable auto-stop", "Set idle timeout to 10 minutes", "Monitor for 1 week"]
  }
]"#;

/// Render the analysis prompt for a context
pub fn build_prompt(context: &AnalysisContext) -> String {
    let data = serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an expert compute cost optimization analyst. Analyze ALL compute resources \
         to identify cost and value leaks.\n\n\
         COMPUTE INFRASTRUCTURE DATA:\n{data}\n\n\
         ANALYSIS REQUIREMENTS:\n\
         1. Cost Leaks: over-provisioned resources, idle compute, unnecessary running instances \
         (idle clusters, running but unused SQL warehouses, idle vector search endpoints, \
         unused or oversized pools, underutilized provisioned stores, idle serving endpoints)\n\
         2. Value Leaks: small jobs on oversized clusters, incorrectly sized warehouses, \
         policies allowing wasteful configurations, apps consuming unnecessary resources\n\
         3. Optimization Opportunities: right-sizing, auto-stop and scheduling, pool tuning, \
         policy improvements, resource consolidation\n\n\
         {OUTPUT_SCHEMA}"
    )
}

/// Locate the JSON payload inside a possibly fenced response
fn extract_payload(text: &str) -> &str {
    let inner = if let Some((_, rest)) = text.split_once(JSON_FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once(FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else {
        text
    };
    inner.trim()
}

/// Decode reasoning output into recommendations
///
/// A JSON array is used as-is, an object carrying `recommendations` yields
/// that value, and any other JSON value becomes a single-element list.
/// Only elements that are not JSON objects are skipped; fields of the wrong
/// shape inside an object fall back to their defaults.
pub fn decode_recommendations(text: &str) -> Result<Vec<Recommendation>, ReasoningError> {
    let payload = extract_payload(text);
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ReasoningError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) if map.contains_key("recommendations") => {
            match map.remove("recommendations") {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        }
        other => vec![other],
    };

    let total = items.len();
    let recommendations: Vec<Recommendation> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!(index, "Skipping non-object recommendation");
                return None;
            }
            match serde_json::from_value(item) {
                Ok(rec) => Some(rec),
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable recommendation");
                    None
                }
            }
        })
        .collect();

    debug!(total, decoded = recommendations.len(), "Decoded reasoning output");
    Ok(recommendations)
}

/// Lenient decode: any failure yields an empty list
pub fn parse_recommendations(text: &str) -> Vec<Recommendation> {
    decode_recommendations(text).unwrap_or_else(|e| {
        warn!(error = %e, "Reasoning output is not valid JSON");
        Vec::new()
    })
}

/// Runs the reasoning capability once over an analysis context
#[derive(Clone)]
pub struct ReasoningAdapter {
    capability: Arc<dyn ReasoningCapability>,
    timeout: Duration,
}

impl ReasoningAdapter {
    pub fn new(capability: Arc<dyn ReasoningCapability>) -> Self {
        Self::with_timeout(capability, REASONING_TIMEOUT)
    }

    pub fn with_timeout(capability: Arc<dyn ReasoningCapability>, timeout: Duration) -> Self {
        Self {
            capability,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Prompt, invoke and decode; never fails and never retries
    pub async fn analyze(&self, context: &AnalysisContext) -> ReasoningOutcome {
        let prompt = build_prompt(context);

        let text = match tokio::time::timeout(self.timeout, self.capability.invoke(&prompt)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Reasoning call failed");
                return ReasoningOutcome::Failed(e.label().to_string());
            }
            Err(_) => {
                let e = ReasoningError::Timeout(self.timeout);
                warn!(error = %e, "Reasoning call timed out");
                return ReasoningOutcome::Failed(e.label().to_string());
            }
        };

        match decode_recommendations(&text) {
            Ok(recs) if recs.is_empty() => ReasoningOutcome::Deferred,
            Ok(recs) => ReasoningOutcome::Success(recs),
            Err(e) => {
                warn!(error = %e, "Reasoning output could not be decoded");
                ReasoningOutcome::Failed(e.label().to_string())
            }
        }
    }
}
