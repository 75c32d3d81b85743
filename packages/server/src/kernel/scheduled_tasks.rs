//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Periodic refresh: re-reads the configured input file, runs the pipeline
//! and writes a timestamped CSV into the output directory.
//!
//! ```text
//! Scheduler (SCOUT_SCHEDULE, daily by default)
//!     │
//!     └─► read_source_urls(SCOUT_INPUT_FILE)
//!             └─► Pipeline::run_and_export ──► SCOUT_OUTPUT_DIR/standardized_data_<ts>.csv
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use project_scout::{read_source_urls, CsvExporter, Pipeline, RunReport};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::Config;

/// Start the periodic refresh.
pub async fn start_scheduler(pipeline: Arc<Pipeline>, config: Config) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let schedule = config.schedule.clone();
    let in_progress = Arc::new(AtomicBool::new(false));
    let refresh_job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let pipeline = pipeline.clone();
        let input_file = config.input_file.clone();
        let output_dir = config.output_dir.clone();
        let in_progress = in_progress.clone();
        Box::pin(async move {
            let Some(_slot) = RefreshSlot::claim(&in_progress) else {
                tracing::warn!("Previous refresh still running, skipping this tick");
                return;
            };
            if let Err(e) = run_scheduled_refresh(&pipeline, &input_file, &output_dir).await {
                tracing::error!("Scheduled refresh failed: {:#}", e);
            }
        })
    })?;

    scheduler.add(refresh_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %schedule, "Scheduled refresh started");
    Ok(scheduler)
}

/// Exclusive claim on the refresh. Released on drop, including when the
/// refresh panics.
struct RefreshSlot {
    in_progress: Arc<AtomicBool>,
}

impl RefreshSlot {
    fn claim(in_progress: &Arc<AtomicBool>) -> Option<Self> {
        if in_progress.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self {
            in_progress: in_progress.clone(),
        })
    }
}

impl Drop for RefreshSlot {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::SeqCst);
    }
}

/// Output path for a refresh started now.
pub fn timestamped_output(output_dir: &Path) -> PathBuf {
    output_dir.join(format!(
        "standardized_data_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Run one refresh: read URLs, run the pipeline, export.
pub async fn run_scheduled_refresh(
    pipeline: &Pipeline,
    input_file: &Path,
    output_dir: &Path,
) -> Result<RunReport> {
    tracing::info!(input = %input_file.display(), "Running scheduled refresh");

    let bytes = tokio::fs::read(input_file)
        .await
        .with_context(|| format!("Failed to open {}", input_file.display()))?;
    let urls = read_source_urls(&bytes[..])
        .with_context(|| format!("Failed to read URLs from {}", input_file.display()))?;

    let exporter = Arc::new(CsvExporter::new(timestamped_output(output_dir)));
    let report = pipeline
        .run_and_export(urls, exporter)
        .await
        .context("Failed to export refresh results")?;

    log_report(&report);
    Ok(report)
}

/// Log a run summary and its failure ledger.
pub fn log_report(report: &RunReport) {
    let result = &report.result;
    tracing::info!(
        outcome = ?report.outcome,
        records = result.records.len(),
        failures = result.failures.len(),
        elapsed_ms = result.elapsed().num_milliseconds(),
        path = ?report.export.as_ref().and_then(|e| e.path.as_ref()),
        "Refresh finished"
    );
    for failure in &result.failures {
        tracing::warn!(
            url = %failure.url,
            stage = %failure.stage,
            error = %failure.kind,
            "Dropped URL"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use project_scout::testing::{MockFetcher, MockScorer};
    use project_scout::{PipelineConfig, RunOutcome};

    fn pipeline() -> Pipeline {
        let fetcher = MockFetcher::new().with_page(
            "https://works.city.gov/projects",
            r#"<html><head><title>Projects</title><meta name="description" content="Bridge retrofit"></head><body>infrastructure projects</body></html>"#,
        );
        Pipeline::new(
            Arc::new(fetcher),
            Arc::new(MockScorer::new()),
            PipelineConfig::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_refresh_writes_timestamped_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input_urls.csv");
        std::fs::write(
            &input,
            "Source URL\nhttps://works.city.gov/projects\nhttps://missing.city.gov\n",
        )
        .unwrap();
        let output_dir = dir.path().join("output");

        let report = run_scheduled_refresh(&pipeline(), &input, &output_dir)
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::PartiallyFailed);
        let path = report.export.unwrap().path.unwrap();
        assert!(path.starts_with(&output_dir));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("standardized_data_"));
        assert!(path.exists());
    }

    #[test]
    fn test_refresh_slot_is_exclusive() {
        let in_progress = Arc::new(AtomicBool::new(false));

        let slot = RefreshSlot::claim(&in_progress);
        assert!(slot.is_some());
        assert!(RefreshSlot::claim(&in_progress).is_none());

        drop(slot);
        assert!(!in_progress.load(Ordering::SeqCst));
        assert!(RefreshSlot::claim(&in_progress).is_some());
    }

    #[test]
    fn test_refresh_slot_released_after_panic() {
        let in_progress = Arc::new(AtomicBool::new(false));

        let flag = in_progress.clone();
        let outcome = std::panic::catch_unwind(move || {
            let _slot = RefreshSlot::claim(&flag).unwrap();
            panic!("refresh blew up");
        });

        assert!(outcome.is_err());
        assert!(!in_progress.load(Ordering::SeqCst));
        assert!(RefreshSlot::claim(&in_progress).is_some());
    }

    #[tokio::test]
    async fn test_missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            run_scheduled_refresh(&pipeline(), &dir.path().join("nope.csv"), dir.path()).await;
        assert!(result.is_err());
    }
}
