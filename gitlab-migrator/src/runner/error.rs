//! Runner error types.

/// Errors that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Settings loading and validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Project list loading errors.
    #[error(transparent)]
    ProjectList(#[from] crate::projects::ProjectListError),

    /// The manifest of a previous run could not be removed.
    #[error(transparent)]
    Manifest(#[from] crate::attachments::AttachmentError),
}
