//! Compute Advisor - cost and value analysis service
//!
//! Lists workspace compute resources on demand, produces optimization
//! recommendations and serves the latest result over HTTP.

use advisor::{api, config::AdvisorConfig};
use advisor_lib::{
    reasoning::{ChatCompletionClient, ReasoningCapability},
    source::{ResourceSource, SnapshotSource, WorkspaceSource},
    AdvisorMetrics, AnalysisService, HealthRegistry, StructuredLogger,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ADVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

async fn build_source(config: &AdvisorConfig) -> Result<Option<Arc<dyn ResourceSource>>> {
    let workspace = config.workspace();
    if workspace.is_configured() {
        let source = WorkspaceSource::new(workspace).context("Failed to create workspace source")?;
        return Ok(Some(Arc::new(source)));
    }

    if let Some(path) = config.snapshot_path() {
        let source = SnapshotSource::from_file(path)
            .await
            .with_context(|| format!("Failed to load inventory snapshot {}", path))?;
        info!(path = %path, "Serving inventory snapshot");
        return Ok(Some(Arc::new(source)));
    }

    warn!("No workspace configured; analysis requests will fail");
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting compute-advisor");

    let config = AdvisorConfig::load()?;

    let source = build_source(&config).await?;
    let reasoning = match config.reasoning() {
        Some(reasoning_config) => {
            let client = ChatCompletionClient::new(reasoning_config)
                .context("Failed to create reasoning client")?;
            Some(client)
        }
        None => {
            warn!("No reasoning provider configured; using rule-based analysis only");
            None
        }
    };
    let provider = reasoning.as_ref().map(|c| c.provider_name());

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(ADVISOR_VERSION, source.is_some(), provider);

    let health_registry = HealthRegistry::new();
    let mut builder = AnalysisService::builder()
        .inventory_config(config.inventory())
        .reasoning_timeout(config.reasoning_timeout())
        .analysis_timeout(config.analysis_timeout())
        .health_registry(health_registry.clone())
        .metrics(AdvisorMetrics::new())
        .instance(config.instance_name.clone());
    if let Some(source) = source {
        builder = builder.source(source);
    }
    if let Some(client) = reasoning {
        builder = builder.reasoning(Arc::new(client) as Arc<dyn ReasoningCapability>);
    }
    let service = Arc::new(builder.build().await);

    let app_state = Arc::new(api::AppState::new(service));

    // Mark advisor as ready after initialization
    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            result.context("API server task panicked")??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
        }
    }

    Ok(())
}
