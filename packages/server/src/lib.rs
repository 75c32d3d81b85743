// Project Scout - Server Core
//
// Upload API, background job worker, scheduled refresh and CLI wiring around
// the `project-scout` discovery pipeline.
//
// Pipeline runs never happen on the request path: uploads are saved and
// enqueued, and a single worker drains the queue.

pub mod config;
pub mod kernel;
pub mod server;
pub mod telemetry;

pub use config::*;
