#![forbid(unsafe_code)]

//! Errors reported by external content providers.

use std::fmt;

/// A content provider could not deliver its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The source is not reachable right now.
    Unavailable(String),
    /// The source answered with data that does not parse.
    Malformed(String),
}

impl ProviderError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "provider unavailable: {reason}"),
            Self::Malformed(reason) => write!(f, "malformed provider data: {reason}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
