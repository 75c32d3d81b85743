//! In-memory job store.
//!
//! The web layer only creates jobs and reads them; the worker owns every
//! transition after that. Pending and running jobs are always kept. Once
//! more than `retain` jobs have finished, the ones that finished first are
//! evicted.

use chrono::Utc;
use project_scout::{RunResult, RunState};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::job::{JobRecord, JobStatus};

/// Finished jobs kept for status and export requests.
pub const DEFAULT_RETAINED_JOBS: usize = 100;

/// Shared, cloneable handle to the job table.
#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
    /// Finished job ids, earliest first
    finished: Arc<Mutex<VecDeque<Uuid>>>,
    retain: usize,
}

impl Default for JobStore {
    fn default() -> Self {
        Self {
            jobs: Default::default(),
            finished: Default::default(),
            retain: DEFAULT_RETAINED_JOBS,
        }
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retain` finished jobs.
    pub fn with_retention(mut self, retain: usize) -> Self {
        self.retain = retain;
        self
    }

    /// Register a pending job and return its id.
    pub async fn create(&self, urls: Vec<String>, source_file: Option<String>) -> Uuid {
        let job = JobRecord::new(urls, source_file);
        let id = job.id;
        self.jobs.write().await.insert(id, job);
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Number of jobs in each status.
    pub async fn counts(&self) -> HashMap<JobStatus, usize> {
        let mut counts = HashMap::new();
        for job in self.jobs.read().await.values() {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }

    pub async fn mark_running(&self, id: Uuid) {
        self.update(id, |job| {
            job.status = JobStatus::Running;
            job.started_at = Some(Utc::now());
        })
        .await;
    }

    pub async fn set_state(&self, id: Uuid, state: RunState) {
        self.update(id, |job| job.state = state).await;
    }

    pub async fn complete(&self, id: Uuid, result: RunResult) {
        self.update(id, |job| {
            job.status = JobStatus::Succeeded;
            job.state = result.final_state();
            job.finished_at = Some(Utc::now());
            job.result = Some(result);
        })
        .await;
        self.retire(id).await;
    }

    pub async fn fail(&self, id: Uuid, error: impl Into<String>) {
        let error = error.into();
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.finished_at = Some(Utc::now());
            job.error = Some(error);
        })
        .await;
        self.retire(id).await;
    }

    /// Note that `id` finished and drop the earliest-finished jobs beyond
    /// the retention limit.
    async fn retire(&self, id: Uuid) {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(&id) {
            return;
        }

        let mut finished = self.finished.lock().await;
        if !finished.contains(&id) {
            finished.push_back(id);
        }
        while finished.len() > self.retain {
            if let Some(evicted) = finished.pop_front() {
                jobs.remove(&evicted);
                tracing::debug!(job_id = %evicted, "Evicted finished job");
            }
        }
    }

    async fn update(&self, id: Uuid, f: impl FnOnce(&mut JobRecord)) {
        match self.jobs.write().await.get_mut(&id) {
            Some(job) => f(job),
            None => tracing::warn!(job_id = %id, "Update for unknown job"),
        }
    }
}
