//! Library for compute cost and value analysis
//!
//! This crate provides the core functionality for:
//! - Listing workspace compute resources
//! - Rule-based and LLM-assisted recommendation generation
//! - Caching the latest analysis and summarizing it
//! - Health checks and observability

pub mod engine;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod reasoning;
pub mod service;
pub mod source;
pub mod store;
pub mod summary;

pub use error::{AdvisorError, ReasoningError, SourceError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AdvisorMetrics, StructuredLogger};
pub use service::{
    AnalysisService, AnalysisServiceBuilder, CachedAnalysis, InventoryStats, RunReport,
};
pub use summary::SummaryMetrics;
