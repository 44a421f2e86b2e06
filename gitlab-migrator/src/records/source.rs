//! Records fetched from the source platform.

use super::{EntityKind, RecordState};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A milestone reference attached to an issue or merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneRef {
    /// Milestone iid on the source platform.
    pub iid: u64,

    /// Milestone title.
    pub title: String,
}

/// Source and target branch of a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchPair {
    /// Branch the changes come from.
    pub source: String,

    /// Branch the changes are merged into.
    pub target: String,
}

/// A comment on an issue or merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    /// Author username.
    pub author: String,

    /// Markdown body.
    pub body: String,

    /// When the comment was written.
    pub created_at: Option<DateTime<Utc>>,
}

/// A record fetched from the source platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    /// Which entity type this record belongs to.
    pub kind: EntityKind,

    /// Per-project sequence number assigned by the source platform.
    pub iid: u64,

    /// Record title.
    pub title: String,

    /// Markdown body (description).
    pub body: String,

    /// Current state.
    pub state: RecordState,

    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,

    /// Link back to the record on the source platform.
    pub web_url: String,

    /// Whether the record is confidential on the source platform.
    pub confidential: bool,

    /// Label names.
    pub labels: Vec<String>,

    /// Milestone the record belongs to, if any.
    pub milestone: Option<MilestoneRef>,

    /// Branches, for merge requests.
    pub branches: Option<BranchPair>,

    /// Whether a milestone belongs to a parent group rather than the project.
    pub ancestor: bool,
}

impl SourceRecord {
    /// Creates a record with the required fields and empty optional ones.
    #[must_use]
    pub fn new(
        kind: EntityKind,
        iid: u64,
        title: impl Into<String>,
        state: RecordState,
        web_url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            iid,
            title: title.into(),
            body: String::new(),
            state,
            created_at: None,
            web_url: web_url.into(),
            confidential: false,
            labels: Vec::new(),
            milestone: None,
            branches: None,
            ancestor: false,
        }
    }
}
