//! Application setup and server configuration.

use std::path::PathBuf;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::{JobQueue, JobStore};
use crate::server::routes::{health_handler, job_export, job_status, process_upload};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobStore,
    pub queue: JobQueue,
    /// Where uploaded URL files are saved
    pub upload_dir: PathBuf,
}

/// Build the Axum application router
///
/// The web layer only saves uploads and enqueues jobs; pipeline runs happen
/// on the job worker.
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/process", post(process_upload))
        .route("/jobs/:id", get(job_status))
        .route("/jobs/:id/export", get(job_export))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
