use anyhow::{Context, Result};
use dotenvy::dotenv;
use project_scout::PipelineConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::kernel::jobs::store::DEFAULT_RETAINED_JOBS;

/// Daily at midnight (sec min hour day month weekday).
pub const DEFAULT_SCHEDULE: &str = "0 0 0 * * *";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub top_k: usize,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    pub run_deadline: Option<Duration>,
    /// Hosted classification endpoint; the keyword scorer is used when unset
    pub scorer_url: Option<String>,
    pub scorer_api_key: Option<String>,
    /// Opt-in stochastic labeler seed
    pub labeler_seed: Option<u64>,
    /// Cron expression for the periodic refresh
    pub schedule: String,
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Finished jobs kept in memory for status and export
    pub job_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            port: 8080,
            top_k: pipeline.top_k,
            concurrency: pipeline.concurrency,
            fetch_timeout: pipeline.fetch.timeout,
            run_deadline: None,
            scorer_url: None,
            scorer_api_key: None,
            labeler_seed: None,
            schedule: DEFAULT_SCHEDULE.to_string(),
            input_file: PathBuf::from("input_urls.csv"),
            output_dir: PathBuf::from("output"),
            upload_dir: PathBuf::from("uploads"),
            job_retention: DEFAULT_RETAINED_JOBS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            top_k: parse_var("SCOUT_TOP_K")?.unwrap_or(defaults.top_k),
            concurrency: parse_var("SCOUT_CONCURRENCY")?.unwrap_or(defaults.concurrency),
            fetch_timeout: parse_var("SCOUT_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            run_deadline: parse_var("SCOUT_RUN_DEADLINE_SECS")?.map(Duration::from_secs),
            scorer_url: non_empty_var("SCOUT_SCORER_URL"),
            scorer_api_key: non_empty_var("SCOUT_SCORER_API_KEY"),
            labeler_seed: parse_var("SCOUT_LABELER_SEED")?,
            schedule: non_empty_var("SCOUT_SCHEDULE").unwrap_or(defaults.schedule),
            input_file: non_empty_var("SCOUT_INPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_file),
            output_dir: non_empty_var("SCOUT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            upload_dir: non_empty_var("SCOUT_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            job_retention: parse_var("SCOUT_JOB_RETENTION")?.unwrap_or(defaults.job_retention),
        })
    }

    /// Pipeline settings derived from this configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let config = PipelineConfig::new()
            .with_top_k(self.top_k)
            .with_concurrency(self.concurrency)
            .with_fetch_timeout(self.fetch_timeout);

        match self.run_deadline {
            Some(deadline) => config.with_run_deadline(deadline),
            None => config,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty_var(name)
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{name} must be a valid number"))
}
