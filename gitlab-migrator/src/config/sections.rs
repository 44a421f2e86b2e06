//! Sections of the settings file.

use crate::attachments::DEFAULT_TARGET_BASE_PATH;
use serde::Deserialize;
use std::path::PathBuf;

/// `[gitlab]`: the project being migrated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabSettings {
    /// Instance URL; `https://gitlab.com` when omitted.
    pub url: Option<String>,

    /// Personal access token.
    #[serde(default)]
    pub token: String,

    /// Numeric project id.
    pub project_id: u64,
}

/// `[github]`: the repository receiving the migration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubSettings {
    /// API endpoint for GitHub Enterprise; api.github.com when omitted.
    pub api_url: Option<String>,

    /// Repository owner (user or organisation).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Personal access token.
    #[serde(default)]
    pub token: String,
}

/// `[transfer]`: which entity types to migrate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransferSettings {
    /// Project description.
    #[serde(default = "default_true")]
    pub description: bool,

    /// Milestones.
    #[serde(default = "default_true")]
    pub milestones: bool,

    /// Milestones inherited from parent groups.
    #[serde(default)]
    pub ancestor_milestones: bool,

    /// Labels.
    #[serde(default = "default_true")]
    pub labels: bool,

    /// Releases.
    #[serde(default = "default_true")]
    pub releases: bool,

    /// Issues.
    #[serde(default = "default_true")]
    pub issues: bool,

    /// Merge requests.
    #[serde(default = "default_true")]
    pub merge_requests: bool,

    /// Comments on issues and merge requests.
    #[serde(default = "default_true")]
    pub comments: bool,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            description: true,
            milestones: true,
            ancestor_milestones: false,
            labels: true,
            releases: true,
            issues: true,
            merge_requests: true,
            comments: true,
        }
    }
}

/// `[attachments]`: where rehomed attachments are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttachmentSettings {
    /// Local directory attachment bytes are written below.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory inside the target repository attachments are published to.
    #[serde(default = "default_target_base_path")]
    pub target_base_path: String,

    /// Manifest location; `{output-dir}/attachments.json` when omitted.
    pub manifest_file: Option<PathBuf>,

    /// Seconds to wait for outstanding writes at the end of a run.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl AttachmentSettings {
    /// Resolved manifest location.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("attachments.json"))
    }
}

impl Default for AttachmentSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            target_base_path: default_target_base_path(),
            manifest_file: None,
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

/// `[s3]`: serve attachments from a bucket instead of the repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct S3Settings {
    /// Bucket name.
    pub bucket: String,

    /// Bucket region.
    pub region: Option<String>,
}

/// `[csv-import]`: column layout of the project list.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CsvImportSettings {
    /// Column holding the GitLab project id.
    #[serde(default)]
    pub gitlab_project_id_column: usize,

    /// Column holding the GitLab project path.
    #[serde(default = "default_gitlab_path_column")]
    pub gitlab_project_path_column: usize,

    /// Column holding the GitHub `owner/repo` or repository name.
    #[serde(default = "default_github_path_column")]
    pub github_project_path_column: usize,
}

impl Default for CsvImportSettings {
    fn default() -> Self {
        Self {
            gitlab_project_id_column: 0,
            gitlab_project_path_column: default_gitlab_path_column(),
            github_project_path_column: default_github_path_column(),
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from("migration-output")
}

pub(crate) fn default_target_base_path() -> String {
    DEFAULT_TARGET_BASE_PATH.to_string()
}

pub(crate) fn default_drain_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_request_delay_ms() -> u64 {
    200
}

fn default_gitlab_path_column() -> usize {
    1
}

fn default_github_path_column() -> usize {
    2
}
