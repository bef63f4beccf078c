//! Tests for resource sources
//!
//! The REST source runs against a mockito workspace; the collector runs
//! against an in-memory source with injectable failures.

#[cfg(test)]
mod workspace_tests {
    use crate::error::SourceError;
    use crate::observability::{AdvisorMetrics, StructuredLogger};
    use crate::source::{
        InventoryCollector, InventoryConfig, ResourceSource, WorkspaceConfig, WorkspaceSource,
    };
    use mockito::Matcher;
    use std::sync::Arc;

    fn source_for(server: &mockito::ServerGuard) -> WorkspaceSource {
        WorkspaceSource::new(WorkspaceConfig {
            host: format!("{}/", server.url()),
            token: "dapi-test".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_clusters_listing_with_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/2.1/clusters/list")
            .match_header("authorization", "Bearer dapi-test")
            .with_status(200)
            .with_body(
                r#"{"clusters": [
                    {"cluster_id": "c-1", "cluster_name": "etl", "state": "RUNNING", "num_workers": 4},
                    {"cluster_id": "c-2", "state": {"cluster_state": "TERMINATED"}}
                ]}"#,
            )
            .create_async()
            .await;

        let clusters = source_for(&server).clusters().await.unwrap();

        assert_eq!(clusters.len(), 2);
        assert!(clusters[0].is_running());
        assert_eq!(clusters[0].num_workers, 4);
        assert_eq!(clusters[1].state, "TERMINATED");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_jobs_follow_pagination() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.1/jobs/list")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"jobs": [{"job_id": 1}], "has_more": true, "next_page_token": "p2"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/2.1/jobs/list")
            .match_query(Matcher::UrlEncoded("page_token".into(), "p2".into()))
            .with_status(200)
            .with_body(r#"{"jobs": [{"job_id": 2}], "has_more": false}"#)
            .create_async()
            .await;

        let jobs = source_for(&server).jobs().await.unwrap();

        let ids: Vec<i64> = jobs.iter().map(|j| j.job_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_malformed_records_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.0/sql/warehouses")
            .with_status(200)
            .with_body(r#"{"warehouses": [{"id": "w-1", "state": "RUNNING"}, "garbage", {"id": 5}]}"#)
            .create_async()
            .await;

        let warehouses = source_for(&server).sql_warehouses().await.unwrap();

        assert_eq!(warehouses.len(), 1);
        assert_eq!(warehouses[0].id, "w-1");
    }

    #[tokio::test]
    async fn test_missing_listing_key_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.0/instance-pools/list")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        assert!(source_for(&server).pools().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.0/apps")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let err = source_for(&server).apps().await.unwrap_err();

        assert!(matches!(err, SourceError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_job_runs_query_and_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/2.1/jobs/runs/list")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("job_id".into(), "42".into()),
                Matcher::UrlEncoded("limit".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"runs": [
                    {"run_id": 1, "job_id": 42, "start_time": 1000, "end_time": 61000},
                    {"run_id": 2, "job_id": 42, "start_time": 1000, "end_time": 0},
                    {"run_id": 3, "job_id": 42}
                ]}"#,
            )
            .create_async()
            .await;

        let runs = source_for(&server).job_runs(42, 2).await.unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].duration_seconds(), Some(60.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ml_jobs_derived_from_single_job_listing() {
        let mut server = mockito::Server::new_async().await;
        let listing = server
            .mock("GET", "/api/2.1/jobs/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"jobs": [
                    {"job_id": 1, "settings": {"tasks": [{"new_cluster": {"spark_version": "14.3.x-cpu-ml-scala2.12"}}]}},
                    {"job_id": 2, "settings": {"tasks": [{"new_cluster": {"spark_version": "14.3.x-scala2.12"}}]}},
                    {"job_id": 3, "settings": {"tasks": [{"existing_cluster_id": "c-1"}]}}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let collector = InventoryCollector::new(
            Arc::new(source_for(&server)),
            InventoryConfig {
                job_run_sample_size: 0,
                ..Default::default()
            },
            AdvisorMetrics::new(),
            StructuredLogger::new("test"),
        );
        let inventory = collector.collect().await;

        assert_eq!(inventory.jobs.len(), 3);
        assert_eq!(inventory.ml_jobs.len(), 1);
        assert_eq!(inventory.ml_jobs[0].job_id, 1);
        listing.assert_async().await;
    }

    #[test]
    fn test_workspace_config_requires_host_and_token() {
        assert!(!WorkspaceConfig::default().is_configured());
        assert!(!WorkspaceConfig {
            host: "https://example.cloud".to_string(),
            ..Default::default()
        }
        .is_configured());
        assert!(WorkspaceConfig {
            host: "https://example.cloud".to_string(),
            token: "t".to_string(),
            ..Default::default()
        }
        .is_configured());
    }
}

#[cfg(test)]
mod collector_tests {
    use crate::error::SourceError;
    use crate::models::*;
    use crate::observability::{AdvisorMetrics, StructuredLogger};
    use crate::source::{InventoryCollector, InventoryConfig, ResourceSource};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct StubSource {
        clusters: Vec<Cluster>,
        jobs: Vec<Job>,
        fail_warehouses: bool,
        hang_pools: bool,
    }

    #[async_trait]
    impl ResourceSource for StubSource {
        async fn clusters(&self) -> Result<Vec<Cluster>, SourceError> {
            Ok(self.clusters.clone())
        }

        async fn jobs(&self) -> Result<Vec<Job>, SourceError> {
            Ok(self.jobs.clone())
        }

        async fn job_runs(&self, job_id: i64, limit: usize) -> Result<Vec<JobRun>, SourceError> {
            if job_id % 2 == 0 {
                return Err(SourceError::Decode("no runs".to_string()));
            }
            Ok((0..limit as i64)
                .map(|run_id| JobRun {
                    run_id,
                    job_id,
                    ..Default::default()
                })
                .collect())
        }

        async fn sql_warehouses(&self) -> Result<Vec<SqlWarehouse>, SourceError> {
            if self.fail_warehouses {
                return Err(SourceError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(vec![SqlWarehouse::default()])
        }

        async fn pools(&self) -> Result<Vec<InstancePool>, SourceError> {
            if self.hang_pools {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(vec![InstancePool::default()])
        }

        async fn vector_search_endpoints(&self) -> Result<Vec<VectorSearchEndpoint>, SourceError> {
            Ok(Vec::new())
        }

        async fn policies(&self) -> Result<Vec<ClusterPolicy>, SourceError> {
            Ok(Vec::new())
        }

        async fn apps(&self) -> Result<Vec<App>, SourceError> {
            Ok(Vec::new())
        }

        async fn provisioned_stores(&self) -> Result<Vec<ProvisionedStore>, SourceError> {
            Ok(Vec::new())
        }

        async fn model_serving_endpoints(&self) -> Result<Vec<ModelServingEndpoint>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn collector(source: StubSource, config: InventoryConfig) -> InventoryCollector {
        InventoryCollector::new(
            Arc::new(source),
            config,
            AdvisorMetrics::new(),
            StructuredLogger::new("test"),
        )
    }

    fn jobs(ids: impl IntoIterator<Item = i64>) -> Vec<Job> {
        ids.into_iter()
            .map(|job_id| Job {
                job_id,
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failed_kind_becomes_empty() {
        let source = StubSource {
            clusters: vec![Cluster::default()],
            fail_warehouses: true,
            ..Default::default()
        };

        let inventory = collector(source, InventoryConfig::default()).collect().await;

        assert_eq!(inventory.clusters.len(), 1);
        assert!(inventory.sql_warehouses.is_empty());
        assert_eq!(inventory.pools.len(), 1);
    }

    #[tokio::test]
    async fn test_timed_out_kind_becomes_empty() {
        let source = StubSource {
            hang_pools: true,
            ..Default::default()
        };
        let config = InventoryConfig {
            fetch_timeout: Duration::from_millis(50),
            ..Default::default()
        };

        let inventory = collector(source, config).collect().await;

        assert!(inventory.pools.is_empty());
        assert_eq!(inventory.sql_warehouses.len(), 1);
    }

    #[tokio::test]
    async fn test_runs_sampled_for_leading_jobs() {
        let source = StubSource {
            jobs: jobs([1, 2, 3, 5, 7]),
            ..Default::default()
        };
        let config = InventoryConfig {
            job_run_sample_size: 3,
            job_run_limit: 4,
            ..Default::default()
        };

        let inventory = collector(source, config).collect().await;

        assert_eq!(inventory.runs_for(1).len(), 4);
        assert!(inventory.runs_for(2).is_empty());
        assert_eq!(inventory.runs_for(3).len(), 4);
        assert!(inventory.runs_for(5).is_empty());
        assert_eq!(inventory.job_runs.len(), 2);
    }

    #[tokio::test]
    async fn test_listings_skip_run_history() {
        let source = StubSource {
            jobs: jobs([1, 3]),
            ..Default::default()
        };

        let inventory = collector(source, InventoryConfig::default())
            .collect_listings()
            .await;

        assert_eq!(inventory.jobs.len(), 2);
        assert_eq!(inventory.pools.len(), 1);
        assert!(inventory.job_runs.is_empty());
    }

    #[tokio::test]
    async fn test_single_kind_listing() {
        let source = StubSource {
            clusters: vec![Cluster::default()],
            jobs: jobs([1]),
            ..Default::default()
        };

        let inventory = collector(source, InventoryConfig::default())
            .collect_kind(ResourceKind::Cluster)
            .await;

        assert_eq!(inventory.clusters.len(), 1);
        assert!(inventory.jobs.is_empty());
        assert!(inventory.sql_warehouses.is_empty());
    }

    #[tokio::test]
    async fn test_failed_run_fetch_is_empty() {
        let collector = collector(StubSource::default(), InventoryConfig::default());

        assert_eq!(collector.job_runs(7, 3).await.len(), 3);
        assert!(collector.job_runs(8, 3).await.is_empty());
    }
}
