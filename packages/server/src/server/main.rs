// Main entry point for the upload API server

use anyhow::{Context, Result};
use server_core::kernel::{build_pipeline, start_scheduler, JobQueue, JobStore};
use server_core::server::{build_app, AppState};
use server_core::{telemetry, Config};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    tracing::info!("Starting Project Scout server");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        top_k = config.top_k,
        concurrency = config.concurrency,
        schedule = %config.schedule,
        "Configuration loaded"
    );

    let pipeline = Arc::new(build_pipeline(&config).context("Failed to build pipeline")?);

    // Background worker
    let shutdown = CancellationToken::new();
    let jobs = JobStore::new().with_retention(config.job_retention);
    let (queue, worker) = JobQueue::start(pipeline.clone(), jobs.clone(), shutdown.clone());

    // Periodic refresh
    let mut scheduler = start_scheduler(pipeline, config.clone())
        .await
        .context("Failed to start scheduler")?;

    let app = build_app(AppState {
        jobs,
        queue,
        upload_dir: config.upload_dir.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down");
    shutdown.cancel();
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Job worker panicked");
    }
    if let Err(e) = scheduler.shutdown().await {
        tracing::error!(error = %e, "Scheduler shutdown failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
