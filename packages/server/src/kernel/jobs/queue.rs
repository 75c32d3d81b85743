//! Job queue and worker.
//!
//! ```text
//! POST /process ──► JobStore::create ──► JobQueue::enqueue
//!                                              │ (mpsc)
//!                                              ▼
//!                                   worker: Pipeline::run_with
//!                                       │ RunState via watch ──► JobStore::set_state
//!                                       └─► JobStore::complete / fail ──► remove saved upload
//! ```

use anyhow::{anyhow, Result};
use project_scout::{Pipeline, RunOptions, RunState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::store::JobStore;

/// Jobs waiting for the worker before `enqueue` starts applying backpressure.
pub const QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
struct QueuedJob {
    id: Uuid,
    urls: Vec<String>,
    /// Saved upload, removed once the job is finished
    upload: Option<PathBuf>,
}

/// Sending half of the job queue. Cheap to clone.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<QueuedJob>,
}

impl JobQueue {
    /// Spawn the worker and return a handle to feed it.
    ///
    /// The worker runs one job at a time (each run is itself concurrent) and
    /// exits when `shutdown` fires or every queue handle is dropped.
    pub fn start(
        pipeline: Arc<Pipeline>,
        store: JobStore,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(run_worker(receiver, pipeline, store, shutdown));
        (Self { sender }, handle)
    }

    pub async fn enqueue(
        &self,
        id: Uuid,
        urls: Vec<String>,
        upload: Option<PathBuf>,
    ) -> Result<()> {
        self.sender
            .send(QueuedJob { id, urls, upload })
            .await
            .map_err(|_| anyhow!("job worker is not running"))
    }

    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<QueuedJob>,
    pipeline: Arc<Pipeline>,
    store: JobStore,
    shutdown: CancellationToken,
) {
    info!("Job worker started");
    loop {
        let job = tokio::select! {
            _ = shutdown.cancelled() => break,
            job = receiver.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };
        process_job(job, &pipeline, &store, &shutdown).await;
    }
    info!("Job worker stopped");
}

async fn process_job(
    job: QueuedJob,
    pipeline: &Arc<Pipeline>,
    store: &JobStore,
    shutdown: &CancellationToken,
) {
    let id = job.id;
    info!(job_id = %id, urls = job.urls.len(), "Processing job");
    store.mark_running(id).await;

    let (progress, mut updates) = watch::channel(RunState::Idle);
    let forward = {
        let store = store.clone();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let state = *updates.borrow_and_update();
                store.set_state(id, state).await;
            }
        })
    };

    let options = RunOptions::new()
        .with_cancel(shutdown.child_token())
        .with_progress(progress);
    let pipeline = pipeline.clone();
    let urls = job.urls;
    let run = tokio::spawn(async move { pipeline.run_with(urls, options).await });

    let outcome = run.await;
    // The progress sender is gone once the run finishes, which ends forwarding.
    let _ = forward.await;

    if let Some(path) = &job.upload {
        remove_upload(path).await;
    }

    match outcome {
        Ok(result) => {
            info!(
                job_id = %id,
                records = result.records.len(),
                failures = result.failures.len(),
                outcome = ?result.outcome(),
                "Job finished"
            );
            store.complete(id, result).await;
        }
        Err(e) => {
            error!(job_id = %id, error = %e, "Job run aborted");
            store.fail(id, e.to_string()).await;
        }
    }
}

/// Delete a saved upload. A file that is already gone is not an error.
pub async fn remove_upload(path: &std::path::Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed upload"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove upload"),
    }
}
