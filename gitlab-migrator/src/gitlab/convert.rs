//! Conversion from GitLab response types to migration records.

use super::types::{
    GitLabIssue, GitLabLabel, GitLabMergeRequest, GitLabMilestone, GitLabMilestoneRef,
    GitLabNote, GitLabRelease,
};
use crate::platform::{Label, Release};
use crate::records::{BranchPair, EntityKind, MilestoneRef, Note, RecordState, SourceRecord};

/// Unknown states are treated as closed.
fn state(state: &str) -> RecordState {
    RecordState::from_gitlab(state).unwrap_or(RecordState::Closed)
}

fn milestone_ref(milestone: Option<GitLabMilestoneRef>) -> Option<MilestoneRef> {
    milestone.map(|m| MilestoneRef {
        iid: m.iid,
        title: m.title,
    })
}

/// Converts a milestone.
pub fn to_milestone_record(milestone: GitLabMilestone) -> SourceRecord {
    SourceRecord {
        body: milestone.description.unwrap_or_default(),
        created_at: milestone.created_at,
        ancestor: milestone.group_id.is_some(),
        ..SourceRecord::new(
            EntityKind::Milestone,
            milestone.iid,
            milestone.title,
            state(&milestone.state),
            milestone.web_url.unwrap_or_default(),
        )
    }
}

/// Converts an issue.
pub fn to_issue_record(issue: GitLabIssue) -> SourceRecord {
    SourceRecord {
        body: issue.description.unwrap_or_default(),
        created_at: issue.created_at,
        confidential: issue.confidential,
        labels: issue.labels,
        milestone: milestone_ref(issue.milestone),
        ..SourceRecord::new(
            EntityKind::Issue,
            issue.iid,
            issue.title,
            state(&issue.state),
            issue.web_url,
        )
    }
}

/// Converts a merge request.
pub fn to_merge_request_record(mr: GitLabMergeRequest) -> SourceRecord {
    SourceRecord {
        body: mr.description.unwrap_or_default(),
        created_at: mr.created_at,
        labels: mr.labels,
        milestone: milestone_ref(mr.milestone),
        branches: Some(BranchPair {
            source: mr.source_branch,
            target: mr.target_branch,
        }),
        ..SourceRecord::new(
            EntityKind::MergeRequest,
            mr.iid,
            mr.title,
            state(&mr.state),
            mr.web_url,
        )
    }
}

/// Converts a label.
pub fn to_label(label: GitLabLabel) -> Label {
    Label {
        name: label.name,
        color: label.color,
        description: label.description.unwrap_or_default(),
    }
}

/// Converts a release; a missing name falls back to the tag.
pub fn to_release(release: GitLabRelease) -> Release {
    Release {
        name: release.name.unwrap_or_else(|| release.tag_name.clone()),
        tag_name: release.tag_name,
        description: release.description.unwrap_or_default(),
        released_at: release.released_at,
    }
}

/// Converts a note, dropping system and confidential notes.
pub fn to_note(note: GitLabNote) -> Option<Note> {
    if note.system || note.confidential {
        return None;
    }
    Some(Note {
        author: note.author.username,
        body: note.body,
        created_at: note.created_at,
    })
}
