//! Fetch results.

use crate::error::ErrorKind;

/// What a fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// HTTP 200 with a readable body
    Ok { body: String },
    /// Network error or a non-200 status
    Failed(ErrorKind),
}

/// Outcome of fetching one URL.
///
/// Transient: consumed by the stage that requested it and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,
    pub status: FetchStatus,
}

impl FetchResult {
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: FetchStatus::Ok { body: body.into() },
        }
    }

    pub fn failed(url: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            url: url.into(),
            status: FetchStatus::Failed(kind),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, FetchStatus::Ok { .. })
    }

    /// Body if the fetch succeeded.
    pub fn body(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Ok { body } => Some(body),
            FetchStatus::Failed(_) => None,
        }
    }

    /// Error kind if the fetch failed.
    pub fn error_kind(&self) -> Option<&ErrorKind> {
        match &self.status {
            FetchStatus::Ok { .. } => None,
            FetchStatus::Failed(kind) => Some(kind),
        }
    }

    /// Convert into the body or the failure reason.
    pub fn into_body(self) -> Result<String, ErrorKind> {
        match self.status {
            FetchStatus::Ok { body } => Ok(body),
            FetchStatus::Failed(kind) => Err(kind),
        }
    }
}
