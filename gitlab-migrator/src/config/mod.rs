//! Settings loading and validation.
//!
//! Settings live in a single TOML file:
//!
//! ```toml
//! use-replacement-issues-for-creation-fails = true
//!
//! [gitlab]
//! url = "https://gitlab.example.com"
//! project-id = 42
//!
//! [github]
//! owner = "acme"
//! repo = "widgets"
//!
//! [transfer]
//! releases = false
//! ```
//!
//! Tokens are usually supplied through the environment by the CLI.

mod error;
mod sections;

pub use error::ConfigError;
pub use sections::{
    AttachmentSettings, CsvImportSettings, GitHubSettings, GitLabSettings, S3Settings,
    TransferSettings,
};

use crate::attachments::StorageBackend;
use crate::records::RecordState;
use sections::{default_request_delay_ms, default_true};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Everything a migration run needs to know.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Source project.
    pub gitlab: GitLabSettings,

    /// Target repository.
    pub github: GitHubSettings,

    /// Entity types to migrate.
    #[serde(default)]
    pub transfer: TransferSettings,

    /// Attachment output.
    #[serde(default)]
    pub attachments: AttachmentSettings,

    /// Object storage for attachments.
    pub s3: Option<S3Settings>,

    /// Project list column layout.
    #[serde(default)]
    pub csv_import: CsvImportSettings,

    /// Fill gaps in issue numbering with placeholder issues.
    #[serde(default = "default_true")]
    pub use_placeholder_issues_for_missing_issues: bool,

    /// Fill gaps in milestone numbering with placeholder milestones.
    #[serde(default = "default_true")]
    pub use_placeholder_milestones_for_missing_milestones: bool,

    /// Create a replacement issue when an issue cannot be created.
    #[serde(default)]
    pub use_replacement_issues_for_creation_fails: bool,

    /// Migrate every merge request as an issue.
    #[serde(default)]
    pub use_issues_for_all_merge_requests: bool,

    /// GitLab merge request states to leave out (`merged`, `closed`, ...).
    #[serde(default)]
    pub skip_merge_request_states: Vec<String>,

    /// Only migrate issues and merge requests with this label.
    pub filter_by_label: Option<String>,

    /// Lower-case label names.
    #[serde(default)]
    pub use_lower_case_labels: bool,

    /// Trim label descriptions over 100 characters instead of dropping them.
    #[serde(default)]
    pub trim_oversized_label_descriptions: bool,

    /// Write merge requests to this file instead of migrating them.
    pub log_merge_requests: Option<PathBuf>,

    /// Pause after every mutating GitHub call, in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// GitLab username to GitHub username.
    #[serde(default)]
    pub usermap: BTreeMap<String, String>,
}

impl Settings {
    /// Loads and validates settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, malformed
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading settings");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        settings.validate(path)?;
        Ok(settings)
    }

    /// Checks values that deserialization cannot.
    ///
    /// Tokens are not checked here because the CLI may fill them in later;
    /// see [`Settings::validate_tokens`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending setting.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        if self.gitlab.project_id == 0 {
            return Err(invalid("gitlab.project-id must not be 0".to_string()));
        }

        for (key, value) in [
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{key} must not be empty")));
            }
            if value.contains('/') {
                return Err(invalid(format!("{key} must not contain '/'")));
            }
        }

        for (key, value) in [
            ("gitlab.url", &self.gitlab.url),
            ("github.api-url", &self.github.api_url),
        ] {
            if let Some(url) = value {
                if Url::parse(url).is_err() {
                    return Err(invalid(format!("{key} is not a valid URL: {url}")));
                }
            }
        }

        if let Some(s3) = &self.s3 {
            if s3.bucket.trim().is_empty() {
                return Err(invalid("s3.bucket must not be empty".to_string()));
            }
        }

        for state in &self.skip_merge_request_states {
            if RecordState::from_gitlab(state).is_none() {
                return Err(invalid(format!(
                    "skip-merge-request-states contains unknown state '{state}'"
                )));
            }
        }

        if self.attachments.target_base_path.trim().is_empty() {
            return Err(invalid(
                "attachments.target-base-path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Checks that both tokens are set to real values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty token or one
    /// still holding a `{{...}}` template placeholder.
    pub fn validate_tokens(&self, path: &Path) -> Result<(), ConfigError> {
        for (key, token) in [
            ("gitlab.token", &self.gitlab.token),
            ("github.token", &self.github.token),
        ] {
            if is_placeholder_token(token) {
                return Err(ConfigError::ValidationError {
                    path: path.display().to_string(),
                    message: format!("{key} is not set"),
                });
            }
        }
        Ok(())
    }

    /// Copy of these settings pointed at another project.
    ///
    /// `github_path` is either `owner/repo` or a bare repository name, which
    /// keeps the configured owner.
    #[must_use]
    pub fn for_project(&self, project_id: u64, github_path: &str) -> Self {
        let mut settings = self.clone();
        settings.gitlab.project_id = project_id;

        match github_path.split_once('/') {
            Some((owner, repo)) => {
                settings.github.owner = owner.to_string();
                settings.github.repo = repo.to_string();
            }
            None => settings.github.repo = github_path.to_string(),
        }
        settings
    }

    /// Pause between mutating GitHub calls.
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// How long to wait for attachment writes at the end of a run.
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.attachments.drain_timeout_secs)
    }

    /// Where attachments are served from.
    #[must_use]
    pub fn storage_backend(&self) -> StorageBackend {
        match &self.s3 {
            Some(s3) => StorageBackend::ObjectStorage {
                bucket: s3.bucket.clone(),
                region: s3.region.clone(),
            },
            None => StorageBackend::LocalDisk,
        }
    }

    /// Merge request states to leave out.
    ///
    /// `locked` merge requests count as closed.
    #[must_use]
    pub fn skipped_merge_request_states(&self) -> Vec<RecordState> {
        self.skip_merge_request_states
            .iter()
            .filter_map(|s| RecordState::from_gitlab(s))
            .collect()
    }
}

fn is_placeholder_token(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || (token.starts_with("{{") && token.ends_with("}}"))
}
