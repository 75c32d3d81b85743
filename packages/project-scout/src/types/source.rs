//! Source URLs - the candidate pages fed into a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

use crate::error::ErrorKind;

/// A validated absolute http(s) URL.
///
/// Immutable once ingested. Two forms are kept: the trimmed URL used for
/// fetching and de-duplication, and the input exactly as supplied, which is
/// what records and failures carry. Equality and hashing use the trimmed
/// form only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceUrl {
    raw: String,
    input: String,
}

impl SourceUrl {
    /// Parse and validate a candidate URL.
    pub fn parse(input: &str) -> Result<Self, ErrorKind> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ErrorKind::InvalidUrl("empty URL".to_string()));
        }

        let url = Url::parse(raw).map_err(|e| ErrorKind::InvalidUrl(format!("{raw}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ErrorKind::InvalidUrl(format!(
                    "{raw}: unsupported scheme {other}"
                )))
            }
        }
        if url.host_str().is_none() {
            return Err(ErrorKind::InvalidUrl(format!("{raw}: missing host")));
        }

        Ok(Self {
            raw: raw.to_string(),
            input: input.to_string(),
        })
    }

    /// The trimmed URL, used for fetching.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The URL exactly as the caller supplied it.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl PartialEq for SourceUrl {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for SourceUrl {}

impl Hash for SourceUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for SourceUrl {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for SourceUrl {
    type Error = ErrorKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SourceUrl> for String {
    fn from(url: SourceUrl) -> Self {
        url.input
    }
}
