//! Job model for background pipeline runs.

use chrono::{DateTime, Utc};
use project_scout::{RunResult, RunState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

// ============================================================================
// Record
// ============================================================================

/// One uploaded batch of URLs and what became of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    /// Latest pipeline state reported by the run
    pub state: RunState,
    /// Saved upload this job was created from
    pub source_file: Option<String>,
    pub urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<RunResult>,
    pub error: Option<String>,
}

impl JobRecord {
    pub fn new(urls: Vec<String>, source_file: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            state: RunState::Idle,
            source_file,
            urls,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
        }
    }

    /// Records ready for download, if the job succeeded with any.
    pub fn exportable_records(&self) -> Option<&[project_scout::CanonicalRecord]> {
        match (&self.status, &self.result) {
            (JobStatus::Succeeded, Some(result)) if !result.records.is_empty() => {
                Some(&result.records)
            }
            _ => None,
        }
    }
}
