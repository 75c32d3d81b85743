//! Upload, job status and export routes.

use axum::{
    extract::{Extension, Multipart, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use project_scout::{read_source_urls, render_csv, Failure, RunOutcome, RunState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{api_error, ApiError};
use crate::kernel::{remove_upload, JobRecord, JobStatus};
use crate::server::app::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct EnqueuedResponse {
    pub job_id: Uuid,
    pub urls: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankedUrl {
    pub url: String,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub state: RunState,
    pub source_file: Option<String>,
    pub urls: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<RunOutcome>,
    pub records: usize,
    pub ranking: Vec<RankedUrl>,
    pub failures: Vec<Failure>,
    pub error: Option<String>,
}

impl From<JobRecord> for JobStatusResponse {
    fn from(job: JobRecord) -> Self {
        let (outcome, records, ranking, failures) = match job.result {
            Some(result) => (
                Some(result.outcome()),
                result.records.len(),
                result
                    .ranking
                    .into_iter()
                    .map(|entry| RankedUrl {
                        url: entry.url,
                        score: entry.score,
                    })
                    .collect(),
                result.failures,
            ),
            None => (None, 0, Vec::new(), Vec::new()),
        };

        Self {
            job_id: job.id,
            status: job.status,
            state: job.state,
            source_file: job.source_file,
            urls: job.urls.len(),
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            outcome,
            records,
            ranking,
            failures,
            error: job.error,
        }
    }
}

/// `POST /process`: save the uploaded file, read its `Source URL` column and
/// enqueue a pipeline run.
pub async fn process_upload(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EnqueuedResponse>), ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Missing multipart field '{UPLOAD_FIELD}'"),
        )
    })?;
    if file_name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No file selected"));
    }

    // Rejected uploads are never written to disk.
    let urls = read_source_urls(&bytes[..])
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    if urls.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Upload contains no source URLs",
        ));
    }

    let saved_name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(&file_name));
    let saved_path = state.upload_dir.join(&saved_name);
    save_upload(&saved_path, &bytes).await.map_err(|e| {
        tracing::error!(path = %saved_path.display(), error = %e, "Failed to save upload");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save upload")
    })?;

    let count = urls.len();
    let job_id = state.jobs.create(urls.clone(), Some(saved_name)).await;
    if let Err(e) = state
        .queue
        .enqueue(job_id, urls, Some(saved_path.clone()))
        .await
    {
        remove_upload(&saved_path).await;
        state.jobs.fail(job_id, e.to_string()).await;
        return Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
    }

    tracing::info!(job_id = %job_id, urls = count, file = %file_name, "Job enqueued");
    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueuedResponse {
            job_id,
            urls: count,
        }),
    ))
}

/// `GET /jobs/:id`
pub async fn job_status(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    state
        .jobs
        .get(id)
        .await
        .map(|job| Json(job.into()))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown job {id}")))
}

/// `GET /jobs/:id/export`: the job's records as a CSV attachment.
pub async fn job_export(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let job = state
        .jobs
        .get(id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown job {id}")))?;

    let records = job.exportable_records().ok_or_else(|| {
        api_error(
            StatusCode::CONFLICT,
            format!("Job {id} has no records to export (status: {:?})", job.status),
        )
    })?;

    let csv = render_csv(records).map_err(|e| {
        tracing::error!(job_id = %id, error = %e, "CSV rendering failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render CSV")
    })?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"standardized_data_{}.csv\"", id.simple()),
        ),
    ];
    Ok((headers, csv).into_response())
}

async fn save_upload(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

/// Reduce an uploaded file name to a safe basename.
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; anything else becomes `_`.
/// Leading dots are dropped so the result is never hidden or a traversal.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload.csv".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("input_urls.csv"), "input_urls.csv");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\my urls.csv"), "my_urls.csv");
        assert_eq!(sanitize_filename("..."), "upload.csv");
        assert_eq!(sanitize_filename(".env"), "env");
    }
}
