//! One analysis pass over a collected inventory

use super::{normalize, AnalysisContext, ContextBuilder, RuleEngine, RunStamp};
use crate::models::{AnalysisResult, AnalysisType, ResourceInventory};
use crate::reasoning::{ReasoningAdapter, ReasoningOutcome};
use tracing::debug;

/// Result of an engine pass plus why reasoning output was not used, if it wasn't
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRun {
    pub result: AnalysisResult,
    /// Set when reasoning was attempted but the baseline was kept
    pub fallback_reason: Option<String>,
}

/// Combines the rule-based baseline with the optional reasoning pass
#[derive(Clone, Default)]
pub struct AnalysisEngine {
    context_builder: ContextBuilder,
    rules: RuleEngine,
    reasoning: Option<ReasoningAdapter>,
}

impl AnalysisEngine {
    pub fn new(context_builder: ContextBuilder, reasoning: Option<ReasoningAdapter>) -> Self {
        Self {
            context_builder,
            rules: RuleEngine::new(),
            reasoning,
        }
    }

    pub fn reasoning_available(&self) -> bool {
        self.reasoning.is_some()
    }

    /// Context for an inventory as the reasoning pass would see it
    pub fn context(&self, inventory: &ResourceInventory) -> AnalysisContext {
        self.context_builder.build(inventory)
    }

    pub async fn run(&self, inventory: &ResourceInventory, stamp: &RunStamp) -> EngineRun {
        let baseline = self.rules.analyze(inventory);

        let (recommendations, analysis_type, fallback_reason) = match &self.reasoning {
            None => (baseline, AnalysisType::RuleBased, None),
            Some(adapter) => {
                let context = self.context_builder.build(inventory);
                match adapter.analyze(&context).await {
                    ReasoningOutcome::Success(recs) => (recs, AnalysisType::Ai, None),
                    outcome => {
                        let reason = outcome.fallback_reason().map(str::to_string);
                        (baseline, AnalysisType::RuleBased, reason)
                    }
                }
            }
        };

        debug!(
            run_id = %stamp.run_id,
            analysis_type = analysis_type.as_str(),
            count = recommendations.len(),
            "Engine pass finished"
        );

        EngineRun {
            result: AnalysisResult {
                recommendations: normalize(recommendations, stamp),
                resource_counts: inventory.counts(),
                timestamp: stamp.timestamp,
                analysis_type,
                reasoning_available: self.reasoning.is_some(),
            },
            fallback_reason,
        }
    }
}
