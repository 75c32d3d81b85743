//! Test harness around the router with an in-process job worker.

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use project_scout::{Pipeline, PipelineConfig};
use serde_json::Value;
use server_core::kernel::{JobQueue, JobStatus, JobStore};
use server_core::server::{build_app, AppState};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

use super::fixtures::{city_fetcher, multipart_body, BOUNDARY};
use project_scout::testing::MockScorer;

/// Test harness that manages the app, its worker and a scratch upload dir.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let (status, body) = ctx.get("/health").await;
/// }
/// ```
pub struct TestHarness {
    pub app: Router,
    pub jobs: JobStore,
    pub upload_dir: TempDir,
    shutdown: CancellationToken,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.shutdown.cancel();
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let pipeline = Pipeline::new(
            Arc::new(city_fetcher()),
            Arc::new(MockScorer::new()),
            PipelineConfig::new().with_concurrency(2),
        )
        .context("Failed to build pipeline")?;

        let upload_dir = tempfile::tempdir().context("Failed to create upload dir")?;
        let shutdown = CancellationToken::new();
        let jobs = JobStore::new();
        let (queue, _worker) = JobQueue::start(Arc::new(pipeline), jobs.clone(), shutdown.clone());

        let app = build_app(AppState {
            jobs: jobs.clone(),
            queue,
            upload_dir: upload_dir.path().to_path_buf(),
        });

        Ok(Self {
            app,
            jobs,
            upload_dir,
            shutdown,
        })
    }

    /// Send a request and return the status and raw body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, body.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    /// Upload a file through `POST /process`.
    pub async fn upload(&self, field: &str, file_name: &str, contents: &str) -> (StatusCode, Value) {
        let request = Request::post("/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field, file_name, contents)))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    /// Number of files currently in the upload directory.
    pub fn saved_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Poll the store until the job reaches a terminal status.
    pub async fn wait_for_job(&self, id: Uuid) -> JobStatus {
        for _ in 0..500 {
            if let Some(job) = self.jobs.get(id).await {
                if job.status.is_terminal() {
                    return job.status;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} did not finish");
    }
}
