//! Entity kinds.

use serde::Serialize;

/// The kind of numbered entity a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A GitLab issue.
    Issue,

    /// A GitLab merge request.
    MergeRequest,

    /// A GitLab milestone.
    Milestone,
}

impl EntityKind {
    /// Human readable noun used in synthesized titles and log lines.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::MergeRequest => "merge request",
            Self::Milestone => "milestone",
        }
    }
}
