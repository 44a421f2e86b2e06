//! GitLab REST v4 response types, reduced to the fields the migration reads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A project.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    /// Project description.
    pub description: Option<String>,

    /// Whether merge requests are enabled; missing on some instances.
    pub merge_requests_enabled: Option<bool>,
}

/// A project or group milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMilestone {
    /// Per-project (or per-group) number.
    pub iid: u64,

    /// Title.
    pub title: String,

    /// Description.
    pub description: Option<String>,

    /// `active` or `closed`.
    pub state: String,

    /// Link to the milestone.
    pub web_url: Option<String>,

    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,

    /// Set for milestones that belong to a group.
    pub group_id: Option<u64>,
}

/// A milestone as embedded in an issue or merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMilestoneRef {
    /// Milestone number.
    pub iid: u64,

    /// Milestone title.
    pub title: String,
}

/// A label.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabLabel {
    /// Name.
    pub name: String,

    /// Colour as `#rrggbb`.
    pub color: String,

    /// Description.
    pub description: Option<String>,
}

/// An issue.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabIssue {
    /// Per-project number.
    pub iid: u64,

    /// Title.
    pub title: String,

    /// Markdown description.
    pub description: Option<String>,

    /// `opened` or `closed`.
    pub state: String,

    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,

    /// Link to the issue.
    pub web_url: String,

    /// Whether the issue is confidential.
    #[serde(default)]
    pub confidential: bool,

    /// Label names.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Milestone, if any.
    pub milestone: Option<GitLabMilestoneRef>,
}

/// A merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMergeRequest {
    /// Per-project number.
    pub iid: u64,

    /// Title.
    pub title: String,

    /// Markdown description.
    pub description: Option<String>,

    /// `opened`, `closed`, `locked` or `merged`.
    pub state: String,

    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,

    /// Link to the merge request.
    pub web_url: String,

    /// Label names.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Milestone, if any.
    pub milestone: Option<GitLabMilestoneRef>,

    /// Branch with the changes.
    pub source_branch: String,

    /// Branch to merge into.
    pub target_branch: String,
}

/// A release.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabRelease {
    /// Tag name.
    pub tag_name: String,

    /// Release name.
    pub name: Option<String>,

    /// Markdown description.
    pub description: Option<String>,

    /// Release date.
    pub released_at: Option<DateTime<Utc>>,
}

/// The author of a note.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabAuthor {
    /// Username.
    pub username: String,
}

/// A comment or system note.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabNote {
    /// Markdown body.
    pub body: String,

    /// Author.
    pub author: GitLabAuthor,

    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,

    /// Whether GitLab generated the note.
    #[serde(default)]
    pub system: bool,

    /// Whether the note is confidential.
    #[serde(default)]
    pub confidential: bool,
}
