//! Health tracking for the advisor service
//!
//! Components report their own status; the overall status is the worst of
//! them. The registry also records which optional collaborators (resource
//! source, reasoning) were configured at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Working with reduced capability, e.g. after a reasoning fallback
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Payload of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub source_configured: bool,
    pub reasoning_configured: bool,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across all components; healthy when there are none
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        let mut has_degraded = false;

        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => has_degraded = true,
                ComponentStatus::Healthy => {}
            }
        }

        if has_degraded {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names
pub mod components {
    pub const RESOURCE_SOURCE: &str = "resource_source";
    pub const REASONING: &str = "reasoning";
    pub const ANALYSIS_STORE: &str = "analysis_store";
}

#[derive(Debug, Clone, Copy, Default)]
struct Capabilities {
    source_configured: bool,
    reasoning_configured: bool,
}

/// Shared registry of component health
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    capabilities: Arc<RwLock<Capabilities>>,
    ready: Arc<RwLock<bool>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            capabilities: Arc::new(RwLock::new(Capabilities::default())),
            ready: Arc::new(RwLock::new(false)),
        }
    }

    /// Register the advisor components according to what was configured
    ///
    /// A missing source is unhealthy: analyses cannot run at all. Missing
    /// reasoning only degrades the service to rule-based analysis. The store
    /// stays degraded until the first analysis completes.
    pub async fn register_advisor(&self, source_configured: bool, reasoning_configured: bool) {
        *self.capabilities.write().await = Capabilities {
            source_configured,
            reasoning_configured,
        };

        let source = if source_configured {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::unhealthy("Workspace host and token not configured")
        };
        let reasoning = if reasoning_configured {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded("No reasoning provider configured; rule-based analysis only")
        };

        let mut registered = self.components.write().await;
        registered.insert(components::RESOURCE_SOURCE.to_string(), source);
        registered.insert(components::REASONING.to_string(), reasoning);
        registered.insert(
            components::ANALYSIS_STORE.to_string(),
            ComponentHealth::degraded("No analysis has run yet"),
        );
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let capabilities = *self.capabilities.read().await;
        HealthResponse {
            status: HealthResponse::compute_status(&components),
            source_configured: capabilities.source_configured,
            reasoning_configured: capabilities.reasoning_configured,
            components,
        }
    }

    /// Ready once startup finished; an unconfigured source does not block
    /// readiness since cached reads and health still work
    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.ready.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("Advisor not yet initialized".to_string()),
            };
        }

        ReadinessResponse {
            ready: true,
            reason: None,
        }
    }
}
