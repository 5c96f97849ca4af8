/// Failures raised while fetching the plugin directory or a stats document.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The resource could not be reached at all.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request completed but the server signaled failure.
    #[error("{status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// A resource in a local source directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The body was not the JSON shape we expected.
    #[error("malformed payload from {locator}: {source}")]
    Malformed {
        locator: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },
}

impl FetchError {
    /// Status code for non-success HTTP responses, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
