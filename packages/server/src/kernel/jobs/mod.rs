//! Background pipeline jobs submitted through the HTTP API.

pub mod job;
pub mod queue;
pub mod store;

pub use job::{JobRecord, JobStatus};
pub use queue::{remove_upload, JobQueue};
pub use store::JobStore;
