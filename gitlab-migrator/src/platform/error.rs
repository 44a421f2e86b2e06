//! Platform client error types.

use thiserror::Error;

/// Errors raised by the source and target platform clients.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// HTTP transport error talking to GitLab.
    #[error("GitLab request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// GitLab answered with an unexpected status.
    #[error("GitLab returned {status} for {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// A response could not be decoded.
    #[error("Failed to decode response from {url}: {source}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A URL could not be built from the configured host.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The platform rejected the request.
    #[error("{0}")]
    Rejected(String),
}
