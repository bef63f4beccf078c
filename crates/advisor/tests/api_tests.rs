//! Integration tests for the advisor API endpoints

use advisor::api::{create_router, AppState};
use advisor_lib::{
    error::ReasoningError,
    health::HealthRegistry,
    models::{Cluster, ResourceInventory},
    reasoning::ReasoningCapability,
    source::SnapshotSource,
    AnalysisService,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

struct CannedReasoning(&'static str);

#[async_trait]
impl ReasoningCapability for CannedReasoning {
    async fn invoke(&self, _prompt: &str) -> Result<String, ReasoningError> {
        Ok(self.0.to_string())
    }
}

fn running_cluster_source() -> Arc<SnapshotSource> {
    Arc::new(SnapshotSource::new(ResourceInventory {
        clusters: vec![Cluster {
            cluster_id: "c-1".to_string(),
            cluster_name: Some("shared".to_string()),
            state: "RUNNING".to_string(),
            num_workers: 3,
            ..Default::default()
        }],
        ..Default::default()
    }))
}

fn workspace_source() -> Arc<SnapshotSource> {
    let inventory: ResourceInventory = serde_json::from_value(serde_json::json!({
        "clusters": [
            {"cluster_id": "c-1", "state": "RUNNING", "num_workers": 0},
            {"cluster_id": "c-2", "state": "RUNNING", "num_workers": 4},
            {"cluster_id": "c-3", "state": "TERMINATED", "num_workers": 2}
        ],
        "jobs": [
            {"job_id": 1, "settings": {"name": "train",
                "tasks": [{"new_cluster": {"spark_version": "14.3.x-cpu-ml-scala2.12"}}]}},
            {"job_id": 2, "settings": {"name": "etl", "tasks": [{"existing_cluster_id": "c-2"}]}}
        ],
        "sql_warehouses": [{"id": "w-1", "state": "RUNNING"}],
        "job_runs": {"2": [{"run_id": 10, "job_id": 2}, {"run_id": 11, "job_id": 2}, {"run_id": 12, "job_id": 2}]}
    }))
    .unwrap();
    Arc::new(SnapshotSource::new(inventory))
}

async fn setup_test_app(
    source: Option<Arc<SnapshotSource>>,
    reasoning: Option<Arc<dyn ReasoningCapability>>,
) -> (Router, HealthRegistry) {
    let health_registry = HealthRegistry::new();
    let mut builder = AnalysisService::builder().health_registry(health_registry.clone());
    if let Some(source) = source {
        builder = builder.source(source);
    }
    if let Some(reasoning) = reasoning {
        builder = builder.reasoning(reasoning);
    }

    let service = Arc::new(builder.build().await);
    let router = create_router(Arc::new(AppState::new(service)));

    (router, health_registry)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    (status, json)
}

#[tokio::test]
async fn test_healthz_returns_503_without_source() {
    let (app, _health) = setup_test_app(None, None).await;

    let (status, health) = send(&app, "GET", "/healthz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["source_configured"], false);
    assert_eq!(health["reasoning_configured"], false);
}

#[tokio::test]
async fn test_healthz_degraded_before_first_run() {
    let (app, _health) = setup_test_app(Some(running_cluster_source()), None).await;

    let (status, health) = send(&app, "GET", "/healthz").await;

    // Degraded still returns 200 (operational)
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["source_configured"], true);
    assert_eq!(health["components"]["resource_source"]["status"], "healthy");
    assert_eq!(health["components"]["analysis_store"]["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_healthy_after_ai_run() {
    let reasoning: Arc<dyn ReasoningCapability> =
        Arc::new(CannedReasoning(r#"[{"type": "cost_leak", "severity": "high", "title": "Idle"}]"#));
    let (app, _health) = setup_test_app(Some(running_cluster_source()), Some(reasoning)).await;

    send(&app, "POST", "/api/v1/analyze").await;
    let (status, health) = send(&app, "GET", "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let (app, health) = setup_test_app(None, None).await;

    let (status, readiness) = send(&app, "GET", "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    health.set_ready(true).await;

    let (status, readiness) = send(&app, "GET", "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_recommendations_before_analysis() {
    let (app, _health) = setup_test_app(Some(running_cluster_source()), None).await;

    let (status, body) = send(&app, "GET", "/api/v1/recommendations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_analysis"], false);
    assert_eq!(
        body["message"],
        "No analysis available. Please run analysis first."
    );
    assert_eq!(body["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_analyze_without_source_returns_503() {
    let (app, _health) = setup_test_app(None, None).await;

    let (status, body) = send(&app, "POST", "/api/v1/analyze").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("not configured"));

    let (_, cached) = send(&app, "GET", "/api/v1/recommendations").await;
    assert_eq!(cached["has_analysis"], false);
}

#[tokio::test]
async fn test_rule_based_analysis_round_trip() {
    let (app, _health) = setup_test_app(Some(running_cluster_source()), None).await;

    let (status, body) = send(&app, "POST", "/api/v1/analyze").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["summary"]["analysis_type"], "rule-based");
    assert_eq!(body["summary"]["recommendation_count"], 1);
    assert_eq!(body["summary"]["resource_counts"]["clusters"], 1);
    assert_eq!(body["summary"]["reasoning_available"], false);
    assert_eq!(body["recommendations"][0]["type"], "cost_leak");
    assert_eq!(body["recommendations"][0]["severity"], "medium");

    let (status, cached) = send(&app, "GET", "/api/v1/recommendations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["has_analysis"], true);
    assert!(cached.get("message").is_none());
    assert_eq!(cached["recommendations"], body["recommendations"]);
}

#[tokio::test]
async fn test_ai_analysis_replaces_rules() {
    let reasoning: Arc<dyn ReasoningCapability> = Arc::new(CannedReasoning(
        r#"```json
[
  {"type": "cost_leak", "severity": "high", "title": "Idle cluster", "estimated_savings": "$500/month"},
  {"type": "value_leak", "severity": "low", "title": "Oversized", "estimated_savings": "30% reduction"}
]
```"#,
    ));
    let (app, _health) = setup_test_app(Some(running_cluster_source()), Some(reasoning)).await;

    let (status, body) = send(&app, "POST", "/api/v1/analyze").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["analysis_type"], "ai");
    assert_eq!(body["summary"]["recommendation_count"], 2);
    for rec in body["recommendations"].as_array().unwrap() {
        assert!(rec["id"].is_string());
        assert!(rec["timestamp"].is_string());
        assert_eq!(rec["confidence_score"], 0.7);
    }

    let (_, summary) = send(&app, "GET", "/api/v1/summary").await;
    assert_eq!(summary["total_cost_savings"], 3500.0);
    assert_eq!(summary["total_cost_savings_formatted"], "$3,500.00");
    assert_eq!(summary["by_severity"]["high"], 1);
    assert_eq!(summary["success_metrics"]["high_priority_actions"], 1);
}

#[tokio::test]
async fn test_summary_before_analysis_is_zeroed() {
    let (app, _health) = setup_test_app(None, None).await;

    let (status, summary) = send(&app, "GET", "/api/v1/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_recommendations"], 0);
    assert_eq!(summary["total_cost_savings_formatted"], "$0.00");
    assert_eq!(summary["analysis_metadata"]["has_analysis"], false);
}

#[tokio::test]
async fn test_analyze_rejects_get() {
    let (app, _health) = setup_test_app(None, None).await;

    let (status, _) = send(&app, "GET", "/api/v1/analyze").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _health) = setup_test_app(Some(running_cluster_source()), None).await;
    send(&app, "POST", "/api/v1/analyze").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("advisor_analysis_duration_seconds_bucket"));
    assert!(metrics_text.contains("advisor_analysis_runs_total"));
    assert!(metrics_text.contains("advisor_recommendations_current"));
}

#[tokio::test]
async fn test_stats_counts_fresh_listings() {
    let (app, _health) = setup_test_app(Some(workspace_source()), None).await;

    let (status, stats) = send(&app, "GET", "/api/v1/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["clusters"], 3);
    assert_eq!(stats["jobs"], 2);
    assert_eq!(stats["ml_jobs"], 1);
    assert_eq!(stats["sql_warehouses"], 1);
    assert_eq!(stats["running_clusters"], 2);
    assert_eq!(stats["idle_clusters"], 1);
    assert!(stats["timestamp"].is_string());
}

#[tokio::test]
async fn test_listings_return_503_without_source() {
    let (app, _health) = setup_test_app(None, None).await;

    for uri in [
        "/api/v1/stats",
        "/api/v1/clusters",
        "/api/v1/jobs/1/runs",
        "/api/v1/compute",
    ] {
        let (status, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_per_kind_listings() {
    let (app, _health) = setup_test_app(Some(workspace_source()), None).await;

    let (status, clusters) = send(&app, "GET", "/api/v1/clusters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clusters.as_array().unwrap().len(), 3);

    let (_, jobs) = send(&app, "GET", "/api/v1/jobs").await;
    assert_eq!(jobs.as_array().unwrap().len(), 2);

    let (_, ml_jobs) = send(&app, "GET", "/api/v1/ml-jobs").await;
    assert_eq!(ml_jobs.as_array().unwrap().len(), 1);
    assert_eq!(ml_jobs[0]["job_id"], 1);

    let (_, warehouses) = send(&app, "GET", "/api/v1/sql-warehouses").await;
    assert_eq!(warehouses[0]["id"], "w-1");

    for uri in [
        "/api/v1/pools",
        "/api/v1/vector-search",
        "/api/v1/policies",
        "/api/v1/apps",
        "/api/v1/lakebase",
        "/api/v1/model-serving",
    ] {
        let (status, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, serde_json::json!([]), "{uri}");
    }
}

#[tokio::test]
async fn test_job_runs_honor_limit() {
    let (app, _health) = setup_test_app(Some(workspace_source()), None).await;

    let (status, runs) = send(&app, "GET", "/api/v1/jobs/2/runs?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(runs.as_array().unwrap().len(), 2);

    let (_, all_runs) = send(&app, "GET", "/api/v1/jobs/2/runs").await;
    assert_eq!(all_runs.as_array().unwrap().len(), 3);

    let (_, none) = send(&app, "GET", "/api/v1/jobs/9/runs").await;
    assert_eq!(none, serde_json::json!([]));
}

#[tokio::test]
async fn test_compute_returns_every_listing() {
    let (app, _health) = setup_test_app(Some(workspace_source()), None).await;

    let (status, compute) = send(&app, "GET", "/api/v1/compute").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(compute["clusters"].as_array().unwrap().len(), 3);
    assert_eq!(compute["ml_jobs"].as_array().unwrap().len(), 1);
    assert_eq!(compute["job_runs"], serde_json::json!({}));
}

#[tokio::test]
async fn test_real_time_recommendations_flagged() {
    let (app, _health) = setup_test_app(Some(running_cluster_source()), None).await;

    let (_, before) = send(&app, "GET", "/api/v1/recommendations/real-time").await;
    assert_eq!(before["real_time"], true);
    assert_eq!(before["has_analysis"], false);

    send(&app, "POST", "/api/v1/analyze").await;
    let (status, after) = send(&app, "GET", "/api/v1/recommendations/real-time").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["real_time"], true);
    assert_eq!(after["has_analysis"], true);
    assert_eq!(after["recommendations"].as_array().unwrap().len(), 1);
}
