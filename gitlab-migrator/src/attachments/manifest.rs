//! The attachment manifest written at the end of a run.
//!
//! Its JSON shape is read by the tooling that uploads the attachments into
//! the target repository, so field names are fixed.

use super::AttachmentError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One rehomed attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// URL the rewritten reference points at.
    pub attachment_url: String,

    /// Path in the target's asset namespace.
    pub target_path: String,

    /// Local copy of the bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

/// All attachments bound for one target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAttachmentGroup {
    /// Target repository clone URL.
    pub repo_url: String,

    /// Tag the attachments are published under.
    pub unique_git_tag: String,

    /// Attachments in registration order.
    pub attachments: Vec<Attachment>,
}

/// Attachment groups keyed by repository id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentManifest {
    groups: BTreeMap<String, RepositoryAttachmentGroup>,
}

impl AttachmentManifest {
    /// Appends an attachment to the group of `repo_id`, creating the group on
    /// first use. An attachment already registered under the same target
    /// path is not added twice.
    pub fn register(
        &mut self,
        repo_id: &str,
        repo_url: &str,
        unique_git_tag: &str,
        attachment: Attachment,
    ) {
        let group = self
            .groups
            .entry(repo_id.to_string())
            .or_insert_with(|| RepositoryAttachmentGroup {
                repo_url: repo_url.to_string(),
                unique_git_tag: unique_git_tag.to_string(),
                attachments: Vec::new(),
            });

        if !group
            .attachments
            .iter()
            .any(|a| a.target_path == attachment.target_path)
        {
            group.attachments.push(attachment);
        }
    }

    /// Adds every attachment of `other`, keeping what is already registered.
    pub fn merge(&mut self, other: &Self) {
        for (repo_id, group) in &other.groups {
            for attachment in &group.attachments {
                self.register(
                    repo_id,
                    &group.repo_url,
                    &group.unique_git_tag,
                    attachment.clone(),
                );
            }
        }
    }

    /// Reads the manifest at `path`; a missing file yields an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, AttachmentError> {
        let json = match tokio::fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(AttachmentError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&json).map_err(|source| AttachmentError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether an attachment with this target path is registered.
    #[must_use]
    pub fn contains(&self, repo_id: &str, target_path: &str) -> bool {
        self.groups.get(repo_id).is_some_and(|group| {
            group
                .attachments
                .iter()
                .any(|a| a.target_path == target_path)
        })
    }

    /// Group for a repository id.
    #[must_use]
    pub fn group(&self, repo_id: &str) -> Option<&RepositoryAttachmentGroup> {
        self.groups.get(repo_id)
    }

    /// Total number of attachments across groups.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.groups.values().map(|g| g.attachments.len()).sum()
    }

    /// Whether nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Serializes the manifest to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::SerializeError`] if serialization fails.
    pub fn to_json(&self) -> Result<String, AttachmentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the manifest to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub async fn write(&self, path: &Path) -> Result<(), AttachmentError> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| AttachmentError::CreateDirError {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, json)
            .await
            .map_err(|source| AttachmentError::WriteError {
                path: path.to_path_buf(),
                source,
            })
    }
}
