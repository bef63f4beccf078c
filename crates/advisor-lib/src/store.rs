//! Single-slot store for the latest analysis
//!
//! Writers replace the whole slot; readers clone the `Arc` and never observe a
//! partially written result.

use crate::models::AnalysisResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A stored analysis and when it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnalysis {
    pub result: AnalysisResult,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisStore {
    slot: Arc<RwLock<Option<Arc<StoredAnalysis>>>>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored analysis unconditionally
    pub async fn write(&self, result: AnalysisResult) -> Arc<StoredAnalysis> {
        let stored = Arc::new(StoredAnalysis {
            result,
            stored_at: Utc::now(),
        });
        *self.slot.write().await = Some(Arc::clone(&stored));
        stored
    }

    /// Latest analysis, or `None` before the first write
    pub async fn read(&self) -> Option<Arc<StoredAnalysis>> {
        self.slot.read().await.clone()
    }
}
