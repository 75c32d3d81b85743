//! Kernel module - pipeline wiring, background jobs and scheduled tasks.

pub mod deps;
pub mod jobs;
pub mod scheduled_tasks;

pub use deps::build_pipeline;
pub use jobs::{remove_upload, JobQueue, JobRecord, JobStatus, JobStore};
pub use scheduled_tasks::{log_report, run_scheduled_refresh, start_scheduler, timestamped_output};
