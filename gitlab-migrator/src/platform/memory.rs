//! In-memory platforms.
//!
//! Used to rehearse a migration without touching either service and as the
//! fakes in tests. The target assigns numbers the way GitHub does: issues and
//! pull requests share one sequence, milestones have their own.

use super::{
    ByteStream, IssueDraft, Label, MilestoneDraft, PlatformError, PullRequestDraft, RecordFilter,
    Release, ReleaseDraft, SourcePlatform, TargetPlatform,
};
use crate::records::{EntityKind, Note, RecordState, SourceRecord, TargetMilestone, TargetRecord};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// A source project held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    /// Project description.
    pub description: Option<String>,

    /// Whether merge requests are enabled.
    pub merge_requests_enabled: bool,

    /// Whether releases are enabled.
    pub releases_enabled: bool,

    /// Milestones, ancestors included.
    pub milestones: Vec<SourceRecord>,

    /// Labels.
    pub labels: Vec<Label>,

    /// Issues.
    pub issues: Vec<SourceRecord>,

    /// Merge requests.
    pub merge_requests: Vec<SourceRecord>,

    /// Releases.
    pub releases: Vec<Release>,

    /// Notes keyed by entity type and iid.
    pub notes: HashMap<(EntityKind, u64), Vec<Note>>,

    /// Upload bytes keyed by relative API path.
    pub attachments: HashMap<String, Vec<u8>>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self {
            description: None,
            merge_requests_enabled: true,
            releases_enabled: true,
            milestones: Vec::new(),
            labels: Vec::new(),
            issues: Vec::new(),
            merge_requests: Vec::new(),
            releases: Vec::new(),
            notes: HashMap::new(),
            attachments: HashMap::new(),
        }
    }
}

fn filtered(records: &[SourceRecord], filter: &RecordFilter) -> Vec<SourceRecord> {
    records
        .iter()
        .filter(|r| {
            filter
                .label
                .as_ref()
                .is_none_or(|label| r.labels.contains(label))
        })
        .cloned()
        .collect()
}

#[async_trait]
impl SourcePlatform for MemorySource {
    async fn project_description(&self) -> Result<Option<String>, PlatformError> {
        Ok(self.description.clone())
    }

    async fn merge_requests_enabled(&self) -> bool {
        self.merge_requests_enabled
    }

    async fn releases_enabled(&self) -> bool {
        self.releases_enabled
    }

    async fn fetch_milestones(
        &self,
        include_ancestors: bool,
    ) -> Result<Vec<SourceRecord>, PlatformError> {
        Ok(self
            .milestones
            .iter()
            .filter(|m| include_ancestors || !m.ancestor)
            .cloned()
            .collect())
    }

    async fn fetch_labels(&self) -> Result<Vec<Label>, PlatformError> {
        Ok(self.labels.clone())
    }

    async fn fetch_issues(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<SourceRecord>, PlatformError> {
        Ok(filtered(&self.issues, filter))
    }

    async fn fetch_merge_requests(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<SourceRecord>, PlatformError> {
        Ok(filtered(&self.merge_requests, filter))
    }

    async fn fetch_releases(&self) -> Result<Vec<Release>, PlatformError> {
        Ok(self.releases.clone())
    }

    async fn fetch_issue_notes(&self, iid: u64) -> Result<Vec<Note>, PlatformError> {
        Ok(self
            .notes
            .get(&(EntityKind::Issue, iid))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_merge_request_notes(&self, iid: u64) -> Result<Vec<Note>, PlatformError> {
        Ok(self
            .notes
            .get(&(EntityKind::MergeRequest, iid))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_attachment(&self, relative_path: &str) -> Option<ByteStream> {
        let Some(bytes) = self.attachments.get(relative_path) else {
            warn!(path = relative_path, "Attachment not found");
            return None;
        };
        let chunk: Result<Bytes, std::io::Error> = Ok(Bytes::from(bytes.clone()));
        Some(Box::pin(futures::stream::iter([chunk])))
    }
}

/// Everything a [`MemoryTarget`] holds.
#[derive(Debug, Clone, Default)]
pub struct MemoryTargetState {
    /// Repository description.
    pub description: Option<String>,

    /// Issues and pull requests, ordered by number.
    pub records: Vec<TargetRecord>,

    /// Milestones, ordered by number.
    pub milestones: Vec<TargetMilestone>,

    /// Labels.
    pub labels: Vec<Label>,

    /// Release tags.
    pub releases: Vec<ReleaseDraft>,

    /// Existing branches.
    pub branches: HashSet<String>,

    /// Comments as `(number, body)`.
    pub comments: Vec<(u64, String)>,

    /// Titles whose creation is rejected.
    pub rejected_titles: HashSet<String>,

    /// Titles that are created but cannot be closed right afterwards.
    pub unclosable_titles: HashSet<String>,
}

/// A target repository held in memory.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    state: Mutex<MemoryTargetState>,
}

impl MemoryTarget {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository from existing state.
    #[must_use]
    pub fn with_state(state: MemoryTargetState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Locks the state for inspection or modification.
    pub fn state(&self) -> MutexGuard<'_, MemoryTargetState> {
        // Every update is a single push or field write, so poisoning is ignored.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn insert(
        &self,
        title: &str,
        body: &str,
        open: bool,
        is_pull_request: bool,
    ) -> Result<TargetRecord, PlatformError> {
        let mut state = self.state();
        if state.rejected_titles.contains(title) {
            return Err(PlatformError::Rejected(format!(
                "creation of '{title}' rejected"
            )));
        }

        let record = TargetRecord {
            number: state.records.len() as u64 + 1,
            title: title.to_string(),
            body: body.to_string(),
            open,
            is_pull_request,
        };
        state.records.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl TargetPlatform for MemoryTarget {
    async fn has_issues_or_pull_requests(&self) -> Result<bool, PlatformError> {
        Ok(!self.state().records.is_empty())
    }

    async fn update_description(&self, description: &str) -> Result<(), PlatformError> {
        self.state().description = Some(description.to_string());
        Ok(())
    }

    async fn list_milestones(&self) -> Result<Vec<TargetMilestone>, PlatformError> {
        Ok(self.state().milestones.clone())
    }

    async fn create_milestone(
        &self,
        draft: &MilestoneDraft,
    ) -> Result<TargetMilestone, PlatformError> {
        let mut state = self.state();
        if state.rejected_titles.contains(&draft.title) {
            return Err(PlatformError::Rejected(format!(
                "milestone '{}' rejected",
                draft.title
            )));
        }

        let milestone = TargetMilestone {
            number: state.milestones.len() as u64 + 1,
            title: draft.title.clone(),
        };
        state.milestones.push(milestone.clone());
        Ok(milestone)
    }

    async fn list_label_names(&self) -> Result<Vec<String>, PlatformError> {
        Ok(self.state().labels.iter().map(|l| l.name.clone()).collect())
    }

    async fn create_label(&self, label: &Label) -> Result<(), PlatformError> {
        let mut state = self.state();
        if state.labels.iter().any(|l| l.name == label.name) {
            return Err(PlatformError::Rejected(format!(
                "label '{}' already exists",
                label.name
            )));
        }
        state.labels.push(label.clone());
        Ok(())
    }

    async fn release_exists(&self, tag_name: &str) -> Result<bool, PlatformError> {
        Ok(self.state().releases.iter().any(|r| r.tag_name == tag_name))
    }

    async fn create_release(&self, draft: &ReleaseDraft) -> Result<(), PlatformError> {
        self.state().releases.push(draft.clone());
        Ok(())
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool, PlatformError> {
        Ok(self.state().branches.contains(branch))
    }

    async fn list_issues(&self) -> Result<Vec<TargetRecord>, PlatformError> {
        Ok(self.state().records.clone())
    }

    async fn list_pull_requests(&self) -> Result<Vec<TargetRecord>, PlatformError> {
        Ok(self
            .state()
            .records
            .iter()
            .filter(|r| r.is_pull_request)
            .cloned()
            .collect())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> Result<TargetRecord, PlatformError> {
        let stays_open = self.state().unclosable_titles.contains(&draft.title);
        if stays_open && !draft.state.is_open() {
            warn!(title = %draft.title, "Created issue but could not close it");
        }
        self.insert(
            &draft.title,
            &draft.body,
            draft.state.is_open() || stays_open,
            false,
        )
    }

    async fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<TargetRecord, PlatformError> {
        self.insert(&draft.title, &draft.body, true, true)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), PlatformError> {
        self.state().comments.push((number, body.to_string()));
        Ok(())
    }

    async fn update_state(
        &self,
        existing: &TargetRecord,
        state: RecordState,
    ) -> Result<(), PlatformError> {
        let mut guard = self.state();
        if let Some(record) = guard
            .records
            .iter_mut()
            .find(|r| r.number == existing.number)
        {
            record.open = state.is_open();
        }
        Ok(())
    }
}
