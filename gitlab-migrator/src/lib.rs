#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod attachments;
pub mod config;
pub mod github;
pub mod gitlab;
pub mod hashing;
pub mod matcher;
pub mod migration;
pub mod placeholders;
pub mod platform;
pub mod projects;
pub mod records;
pub mod runner;
pub mod summary;

pub use attachments::{
    derive_location, derive_object_location, Attachment, AttachmentError, AttachmentLocation,
    AttachmentManifest, AttachmentStore, AttachmentStoreConfig, RepositoryAttachmentGroup,
    StorageBackend,
};
pub use config::{ConfigError, Settings};
pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use matcher::{find_existing, find_existing_merge_request, ExistingMergeRequest};
pub use migration::{MigrationError, Migrator};
pub use placeholders::{align_milestones, fill_gaps, fill_gaps_with, NumberingMap, Sequenced};
pub use platform::{
    MemorySource, MemoryTarget, MemoryTargetState, PlatformError, SourcePlatform, TargetPlatform,
};
pub use projects::{load_project_list, ProjectListError, ProjectMapping};
pub use records::{EntityKind, Record, RecordState, SourceRecord, TargetRecord};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{EntityCounters, MigrationSummary, ProcessingResult, RecordOutcome, RunSummary};
