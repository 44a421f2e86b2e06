//! Boundaries to the source and target platforms.
//!
//! The migration core only talks to the platforms through these traits. The
//! GitLab and GitHub clients implement them; tests use in-memory fakes.

mod error;
mod memory;
mod types;

pub use error::PlatformError;
pub use memory::{MemorySource, MemoryTarget, MemoryTargetState};
pub use types::{
    ByteStream, IssueDraft, Label, MilestoneDraft, PullRequestDraft, RecordFilter, Release,
    ReleaseDraft,
};

use crate::records::{Note, RecordState, SourceRecord, TargetMilestone, TargetRecord};
use async_trait::async_trait;

/// Read access to the project being migrated.
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    /// Project description, if any.
    async fn project_description(&self) -> Result<Option<String>, PlatformError>;

    /// Whether merge requests are enabled for the project.
    async fn merge_requests_enabled(&self) -> bool;

    /// Whether releases are accessible for the project.
    async fn releases_enabled(&self) -> bool;

    /// Milestones, optionally including those inherited from parent groups.
    async fn fetch_milestones(
        &self,
        include_ancestors: bool,
    ) -> Result<Vec<SourceRecord>, PlatformError>;

    /// Project labels.
    async fn fetch_labels(&self) -> Result<Vec<Label>, PlatformError>;

    /// Issues matching the filter.
    async fn fetch_issues(&self, filter: &RecordFilter) -> Result<Vec<SourceRecord>, PlatformError>;

    /// Merge requests matching the filter.
    async fn fetch_merge_requests(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<SourceRecord>, PlatformError>;

    /// Releases.
    async fn fetch_releases(&self) -> Result<Vec<Release>, PlatformError>;

    /// Non-system, non-confidential comments of an issue.
    async fn fetch_issue_notes(&self, iid: u64) -> Result<Vec<Note>, PlatformError>;

    /// Non-system, non-confidential comments of a merge request.
    async fn fetch_merge_request_notes(&self, iid: u64) -> Result<Vec<Note>, PlatformError>;

    /// Downloads an upload given its `{project}/uploads/{secret}/{file}` path.
    ///
    /// Returns `None` (after logging) when the download fails.
    async fn fetch_attachment(&self, relative_path: &str) -> Option<ByteStream>;
}

/// Write access to the repository receiving the migration.
#[async_trait]
pub trait TargetPlatform: Send + Sync {
    /// Whether any issue or pull request exists.
    async fn has_issues_or_pull_requests(&self) -> Result<bool, PlatformError>;

    /// Replaces the repository description.
    async fn update_description(&self, description: &str) -> Result<(), PlatformError>;

    /// All milestones.
    async fn list_milestones(&self) -> Result<Vec<TargetMilestone>, PlatformError>;

    /// Creates a milestone and returns it with its assigned number.
    async fn create_milestone(&self, draft: &MilestoneDraft)
        -> Result<TargetMilestone, PlatformError>;

    /// All label names.
    async fn list_label_names(&self) -> Result<Vec<String>, PlatformError>;

    /// Creates a label.
    async fn create_label(&self, label: &Label) -> Result<(), PlatformError>;

    /// Whether a release for the tag exists.
    async fn release_exists(&self, tag_name: &str) -> Result<bool, PlatformError>;

    /// Creates a release.
    async fn create_release(&self, draft: &ReleaseDraft) -> Result<(), PlatformError>;

    /// Whether a branch exists.
    async fn branch_exists(&self, branch: &str) -> Result<bool, PlatformError>;

    /// All issues, pull requests included.
    async fn list_issues(&self) -> Result<Vec<TargetRecord>, PlatformError>;

    /// All pull requests.
    async fn list_pull_requests(&self) -> Result<Vec<TargetRecord>, PlatformError>;

    /// Creates an issue, closing it afterwards when the draft is not open.
    ///
    /// An error means no number was taken. A close that fails after creation
    /// is logged and the record is returned with `open` set.
    async fn create_issue(&self, draft: &IssueDraft) -> Result<TargetRecord, PlatformError>;

    /// Creates a pull request.
    ///
    /// An error means no number was taken. Labels or a milestone that cannot
    /// be applied afterwards are logged and the record is still returned.
    async fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<TargetRecord, PlatformError>;

    /// Adds a comment to an issue or pull request.
    async fn create_comment(&self, number: u64, body: &str) -> Result<(), PlatformError>;

    /// Opens or closes an existing record to mirror the source state.
    async fn update_state(
        &self,
        existing: &TargetRecord,
        state: RecordState,
    ) -> Result<(), PlatformError>;
}
