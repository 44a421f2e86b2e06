//! Record states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Open issue/merge request, or active milestone.
    Open,

    /// Closed without merging.
    Closed,

    /// Merged merge request.
    Merged,
}

impl RecordState {
    /// Parses a GitLab state string.
    ///
    /// GitLab uses `opened` for issues and merge requests, `active` for
    /// milestones and `locked` for merge requests that are closed for
    /// discussion.
    #[must_use]
    pub fn from_gitlab(state: &str) -> Option<Self> {
        match state {
            "opened" | "active" => Some(Self::Open),
            "closed" | "locked" => Some(Self::Closed),
            "merged" => Some(Self::Merged),
            _ => None,
        }
    }

    /// Returns the state as GitLab spells it for issues and merge requests.
    #[must_use]
    pub fn as_gitlab_str(self) -> &'static str {
        match self {
            Self::Open => "opened",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }

    /// Returns true for [`RecordState::Open`].
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gitlab_states() {
        assert_eq!(RecordState::from_gitlab("opened"), Some(RecordState::Open));
        assert_eq!(RecordState::from_gitlab("active"), Some(RecordState::Open));
        assert_eq!(RecordState::from_gitlab("closed"), Some(RecordState::Closed));
        assert_eq!(RecordState::from_gitlab("locked"), Some(RecordState::Closed));
        assert_eq!(RecordState::from_gitlab("merged"), Some(RecordState::Merged));
        assert_eq!(RecordState::from_gitlab("reopened"), None);
    }

    #[test]
    fn round_trips_through_skip_list_spelling() {
        for state in [RecordState::Open, RecordState::Closed, RecordState::Merged] {
            assert_eq!(RecordState::from_gitlab(state.as_gitlab_str()), Some(state));
        }
    }
}
