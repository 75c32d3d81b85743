use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::kernel::JobStatus;
use crate::server::app::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub worker: String,
    pub jobs: JobCounts,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobCounts {
    pub pending: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Health check endpoint
///
/// Returns 200 OK while the job worker accepts work, 503 Service Unavailable
/// otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let counts = state.jobs.counts().await;
    let count = |status| counts.get(&status).copied().unwrap_or(0);
    let jobs = JobCounts {
        pending: count(JobStatus::Pending),
        running: count(JobStatus::Running),
        succeeded: count(JobStatus::Succeeded),
        failed: count(JobStatus::Failed),
    };

    let is_healthy = state.queue.is_open();

    let (status_code, overall_status, worker) = if is_healthy {
        (StatusCode::OK, "healthy", "running")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "stopped")
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            worker: worker.to_string(),
            jobs,
        }),
    )
}
