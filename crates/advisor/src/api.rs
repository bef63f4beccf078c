//! HTTP API for analysis, health checks and Prometheus metrics

use advisor_lib::{
    health::ComponentStatus,
    models::{
        App, Cluster, ClusterPolicy, InstancePool, Job, JobRun, ModelServingEndpoint,
        ProvisionedStore, Recommendation, ResourceInventory, ResourceKind, SqlWarehouse,
        VectorSearchEndpoint,
    },
    service::{AnalysisService, CachedAnalysis, InventoryStats, RunReport},
    summary::SummaryMetrics,
    AdvisorError,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(service: Arc<AnalysisService>) -> Self {
        Self { service }
    }
}

/// Body returned by a successful analysis trigger
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
    pub summary: RunReport,
}

/// Cached analysis flagged for live dashboards
#[derive(Debug, Serialize)]
pub struct RealTimeAnalysis {
    #[serde(flatten)]
    pub analysis: CachedAnalysis,
    pub real_time: bool,
}

/// Runs fetched per job when no limit is given
pub const DEFAULT_RUN_LIMIT: usize = 25;

#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    pub limit: Option<usize>,
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Run-level failure mapped to an HTTP status
pub struct ApiError(AdvisorError);

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AdvisorError::SourceNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AdvisorError::AnalysisTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };
        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.service.health().health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.service.health().readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn analyze(State(state): State<Arc<AppState>>) -> Result<Json<AnalyzeResponse>, ApiError> {
    let result = state.service.analyze_now().await?;
    let summary = RunReport::from_result(&result);

    Ok(Json(AnalyzeResponse {
        success: true,
        recommendations: result.recommendations,
        summary,
    }))
}

async fn recommendations(State(state): State<Arc<AppState>>) -> Json<CachedAnalysis> {
    Json(state.service.current().await)
}

async fn summary(State(state): State<Arc<AppState>>) -> Json<SummaryMetrics> {
    Json(state.service.summary().await)
}

async fn real_time_recommendations(State(state): State<Arc<AppState>>) -> Json<RealTimeAnalysis> {
    Json(RealTimeAnalysis {
        analysis: state.service.current().await,
        real_time: true,
    })
}

async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<InventoryStats>, ApiError> {
    Ok(Json(state.service.stats().await?))
}

/// Every current listing in one body
async fn compute(State(state): State<Arc<AppState>>) -> Result<Json<ResourceInventory>, ApiError> {
    Ok(Json(state.service.inventory().await?))
}

async fn job_runs(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<Vec<JobRun>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RUN_LIMIT);
    Ok(Json(state.service.job_runs(job_id, limit).await?))
}

async fn listing(state: &AppState, kind: ResourceKind) -> Result<ResourceInventory, ApiError> {
    Ok(state.service.listing(kind).await?)
}

async fn jobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Job>>, ApiError> {
    Ok(Json(listing(&state, ResourceKind::Job).await?.jobs))
}

async fn clusters(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Cluster>>, ApiError> {
    Ok(Json(listing(&state, ResourceKind::Cluster).await?.clusters))
}

async fn sql_warehouses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SqlWarehouse>>, ApiError> {
    Ok(Json(
        listing(&state, ResourceKind::SqlWarehouse)
            .await?
            .sql_warehouses,
    ))
}

async fn pools(State(state): State<Arc<AppState>>) -> Result<Json<Vec<InstancePool>>, ApiError> {
    Ok(Json(listing(&state, ResourceKind::Pool).await?.pools))
}

async fn vector_search(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VectorSearchEndpoint>>, ApiError> {
    Ok(Json(
        listing(&state, ResourceKind::VectorSearchEndpoint)
            .await?
            .vector_search_endpoints,
    ))
}

async fn policies(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ClusterPolicy>>, ApiError> {
    Ok(Json(listing(&state, ResourceKind::Policy).await?.policies))
}

async fn apps(State(state): State<Arc<AppState>>) -> Result<Json<Vec<App>>, ApiError> {
    Ok(Json(listing(&state, ResourceKind::App).await?.apps))
}

async fn provisioned_stores(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProvisionedStore>>, ApiError> {
    Ok(Json(
        listing(&state, ResourceKind::ProvisionedStore)
            .await?
            .provisioned_stores,
    ))
}

async fn ml_jobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Job>>, ApiError> {
    Ok(Json(listing(&state, ResourceKind::MlJob).await?.ml_jobs))
}

async fn model_serving(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ModelServingEndpoint>>, ApiError> {
    Ok(Json(
        listing(&state, ResourceKind::ModelServingEndpoint)
            .await?
            .model_serving_endpoints,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/recommendations", get(recommendations))
        .route(
            "/api/v1/recommendations/real-time",
            get(real_time_recommendations),
        )
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/compute", get(compute))
        .route("/api/v1/jobs", get(jobs))
        .route("/api/v1/jobs/:job_id/runs", get(job_runs))
        .route("/api/v1/ml-jobs", get(ml_jobs))
        .route("/api/v1/clusters", get(clusters))
        .route("/api/v1/sql-warehouses", get(sql_warehouses))
        .route("/api/v1/pools", get(pools))
        .route("/api/v1/vector-search", get(vector_search))
        .route("/api/v1/policies", get(policies))
        .route("/api/v1/apps", get(apps))
        .route("/api/v1/lakebase", get(provisioned_stores))
        .route("/api/v1/model-serving", get(model_serving))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
