//! Migration error types.

use crate::attachments::AttachmentError;
use crate::platform::PlatformError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The target already holds issues or pull requests.
    #[error("Issues or pull requests already exist in {repository}; numbering cannot be aligned")]
    ExistingTargetRecords { repository: String },

    /// A merge request could not be created.
    #[error("Failed to create merge request !{iid} '{title}': {source}")]
    MergeRequestCreation {
        iid: u64,
        title: String,
        #[source]
        source: PlatformError,
    },

    /// Neither an issue nor its replacement could be created.
    #[error("Failed to create replacement for issue #{iid} '{title}': {source}")]
    ReplacementCreation {
        iid: u64,
        title: String,
        #[source]
        source: PlatformError,
    },

    /// A platform call the run depends on failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The attachment manifest could not be written or removed.
    #[error(transparent)]
    Manifest(#[from] AttachmentError),

    /// The merge request log could not be written.
    #[error("Failed to write merge request log {path}: {source}")]
    MergeRequestLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The merge request log could not be serialized.
    #[error("Failed to serialize merge request log: {0}")]
    SerializeError(#[from] serde_json::Error),
}
