//! Error types for the content API client
//!
//! Every fallible API operation returns `Result<T, ApiError>`. Transport
//! and non-success-status failures are separated from decode failures so
//! callers can tell a flaky network from a wire-shape mismatch.

use thiserror::Error;

/// Errors raised by [`ContentApi`](super::ContentApi) operations
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document '{id}' is missing required field '{field}'")]
    MissingField { field: &'static str, id: String },

    #[error("No master ref found at {url}")]
    NoMasterRef { url: String },

    #[error("No document found with uid '{uid}'")]
    NotFound { uid: String },
}

impl ApiError {
    /// True for a missing document, as opposed to a failed or garbled request
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
