//! Attachment store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting attachments or the manifest.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Failed to create a parent directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to disk.
    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The download stream broke off.
    #[error("Download for {path} failed: {source}")]
    StreamError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an existing manifest.
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing manifest is not valid JSON.
    #[error("Attachment manifest {path} is malformed: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to remove a stale manifest.
    #[error("Failed to remove {path}: {source}")]
    RemoveError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be serialized.
    #[error("Failed to serialize attachment manifest: {0}")]
    SerializeError(#[from] serde_json::Error),
}
