//! Run state and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Failure, Stage};
use crate::exporters::ExportSummary;
use crate::types::record::CanonicalRecord;
use crate::types::score::ScoreEntry;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    /// Fetching text and scoring every candidate
    Fetching,
    Ranking,
    ExtractingStandardizing,
    Exporting,
    Done,
    /// Finished, but at least one URL was dropped
    PartiallyFailed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Ranking => "ranking",
            RunState::ExtractingStandardizing => "extracting_standardizing",
            RunState::Exporting => "exporting",
            RunState::Done => "done",
            RunState::PartiallyFailed => "partially_failed",
        };
        f.write_str(s)
    }
}

/// How a finished run turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Records produced and nothing dropped
    Complete,
    /// Records produced, some URLs dropped
    PartiallyFailed,
    /// No records at all
    Empty,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Standardized records, in rank order
    pub records: Vec<CanonicalRecord>,
    /// Every dropped URL and why, stage by stage, input order within a stage
    pub failures: Vec<Failure>,
    /// Ranked survivors with their scores
    pub ranking: Vec<ScoreEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    pub fn outcome(&self) -> RunOutcome {
        if self.records.is_empty() {
            RunOutcome::Empty
        } else if self.failures.is_empty() {
            RunOutcome::Complete
        } else {
            RunOutcome::PartiallyFailed
        }
    }

    /// Failures recorded at a given stage.
    pub fn failures_at(&self, stage: Stage) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    /// Final state to report once the run has finished.
    pub fn final_state(&self) -> RunState {
        if self.failures.is_empty() {
            RunState::Done
        } else {
            RunState::PartiallyFailed
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// A run together with what happened at export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub result: RunResult,
    /// `None` when the run had nothing to export
    pub export: Option<ExportSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn empty_result() -> RunResult {
        let now = Utc::now();
        RunResult {
            records: vec![],
            failures: vec![],
            ranking: vec![],
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_empty_outcome_is_distinct() {
        let mut result = empty_result();
        assert_eq!(result.outcome(), RunOutcome::Empty);

        result.failures.push(Failure::new(
            "https://example.com",
            Stage::FetchText,
            ErrorKind::HttpStatus(404),
        ));
        assert_eq!(result.outcome(), RunOutcome::Empty);
        assert_eq!(result.final_state(), RunState::PartiallyFailed);
        assert_eq!(result.failures_at(Stage::FetchText).count(), 1);
        assert_eq!(result.failures_at(Stage::Score).count(), 0);
    }
}
