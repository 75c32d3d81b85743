//! Domain types shared across pipeline stages.

pub mod config;
pub mod fetch;
pub mod metadata;
pub mod record;
pub mod run;
pub mod score;
pub mod source;
