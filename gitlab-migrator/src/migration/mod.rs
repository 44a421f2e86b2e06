//! Sequencing of a single project migration.
//!
//! A [`Migrator`] walks the entity types in dependency order: description,
//! milestones, labels, releases, issues and finally merge requests. Creation
//! is strictly sequential so that target numbers follow source numbers.
//!
//! Failure policy:
//!
//! - Existing issues or pull requests on the target abort the run before
//!   anything is created.
//! - Milestone, label and release failures are logged and counted.
//! - A failed issue is counted, or replaced when replacement issues are
//!   enabled. A failed replacement aborts the run.
//! - A failed merge request aborts the run.

mod drafts;
mod error;
mod issues;
mod labels;
mod merge_requests;
mod milestones;
mod releases;

pub use drafts::{
    comment_body, mention, sanitize_label_description, synthetic_labels, with_back_reference,
    HAS_ATTACHMENT_LABEL, MAX_LABEL_DESCRIPTION, MERGE_REQUEST_LABEL,
};
pub use error::MigrationError;
pub use merge_requests::{LoggedMergeRequest, MergeRequestLog};

use crate::attachments::{find_upload_references, AttachmentStore, AttachmentStoreConfig};
use crate::config::Settings;
use crate::placeholders::NumberingMap;
use crate::platform::{RecordFilter, SourcePlatform, TargetPlatform};
use crate::records::{EntityKind, Record};
use crate::summary::MigrationSummary;
use tracing::{info, info_span, warn, Instrument};

/// Body of a record ready to be sent to the target.
struct PreparedBody {
    text: String,
    unresolved_attachments: bool,
}

/// Migrates one GitLab project into one GitHub repository.
pub struct Migrator<'a, S: ?Sized, T: ?Sized> {
    settings: &'a Settings,
    source: &'a S,
    target: &'a T,
    attachments: AttachmentStore,
    milestone_numbers: Option<NumberingMap>,
    summary: MigrationSummary,
}

impl<'a, S, T> Migrator<'a, S, T>
where
    S: SourcePlatform + ?Sized,
    T: TargetPlatform + ?Sized,
{
    /// Creates a migrator for the project and repository named in `settings`.
    pub fn new(settings: &'a Settings, source: &'a S, target: &'a T) -> Self {
        let attachments = AttachmentStore::new(AttachmentStoreConfig {
            owner: settings.github.owner.clone(),
            repo: settings.github.repo.clone(),
            default_project: settings.gitlab.project_id.to_string(),
            target_base_path: settings.attachments.target_base_path.clone(),
            output_root: settings.attachments.output_dir.clone(),
            backend: settings.storage_backend(),
        });
        let summary = MigrationSummary::new(
            settings.gitlab.project_id,
            format!("{}/{}", settings.github.owner, settings.github.repo),
        );

        Self {
            settings,
            source,
            target,
            attachments,
            milestone_numbers: None,
            summary,
        }
    }

    /// Runs every enabled phase, then merges this project's attachments into
    /// the manifest and waits for attachment writes to finish.
    ///
    /// The manifest is shared by every project of a run; clearing a leftover
    /// one is up to the caller, see [`crate::attachments::remove_stale_manifest`].
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] for the fatal cases listed in the module
    /// documentation and when a fetch the run depends on fails. Outstanding
    /// attachment writes are drained before an error is returned.
    pub async fn migrate(mut self) -> Result<MigrationSummary, MigrationError> {
        let manifest_path = self.settings.attachments.manifest_path();
        info!(path = %manifest_path.display(), "Using attachment manifest");

        let result = self.run_phases().await;
        if result.is_ok() {
            if let Err(e) = self.attachments.flush(&manifest_path).await {
                self.drain_attachments().await;
                return Err(e.into());
            }
        }
        self.drain_attachments().await;

        result.map(|()| self.summary)
    }

    async fn run_phases(&mut self) -> Result<(), MigrationError> {
        let settings = self.settings;
        let transfer = &settings.transfer;

        if (transfer.issues || transfer.merge_requests)
            && self.target.has_issues_or_pull_requests().await?
        {
            return Err(MigrationError::ExistingTargetRecords {
                repository: self.summary.repository.clone(),
            });
        }

        let releases = transfer.releases && self.source.releases_enabled().await;
        if transfer.releases && !releases {
            warn!("Releases are disabled for this project on GitLab, skipping them");
        }

        if transfer.description {
            self.migrate_description()
                .instrument(info_span!("description"))
                .await?;
        }
        if transfer.milestones {
            self.migrate_milestones()
                .instrument(info_span!("milestones"))
                .await?;
        }
        if transfer.labels {
            self.migrate_labels().instrument(info_span!("labels")).await?;
        }
        if releases {
            self.migrate_releases()
                .instrument(info_span!("releases"))
                .await?;
        }
        if transfer.issues {
            self.migrate_issues().instrument(info_span!("issues")).await?;
        }
        if transfer.merge_requests {
            self.migrate_merge_requests()
                .instrument(info_span!("merge_requests"))
                .await?;
        }
        Ok(())
    }

    async fn drain_attachments(&mut self) {
        self.summary.attachments = self.attachments.manifest().attachment_count();
        self.summary.attachments_drained =
            self.attachments.drain(self.settings.drain_timeout()).await;
    }

    /// Copies the project description.
    ///
    /// # Errors
    ///
    /// Returns an error if the description cannot be read or written.
    pub async fn migrate_description(&mut self) -> Result<(), MigrationError> {
        info!("Transferring description");

        match self.source.project_description().await? {
            Some(description) if !description.trim().is_empty() => {
                self.target.update_description(&description).await?;
                self.summary.description_transferred = true;
                info!("Description transferred");
            }
            _ => info!("Description is empty, nothing to transfer"),
        }
        Ok(())
    }

    /// Counters collected so far.
    #[must_use]
    pub fn summary(&self) -> &MigrationSummary {
        &self.summary
    }

    /// Attachments rehomed so far.
    #[must_use]
    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            label: self.settings.filter_by_label.clone(),
        }
    }

    /// Label name as it exists on the target.
    fn label_name(&self, name: &str) -> String {
        if self.settings.use_lower_case_labels {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    fn record_labels(&self, record: &Record, unresolved_attachments: bool) -> Vec<String> {
        let mut labels: Vec<String> = record
            .labels()
            .iter()
            .map(|name| self.label_name(name))
            .collect();
        if unresolved_attachments {
            labels.push(self.label_name(HAS_ATTACHMENT_LABEL));
        }
        labels
    }

    /// Rewrites attachments and, for fetched records, appends the back-reference.
    async fn prepare_body(&mut self, record: &Record) -> PreparedBody {
        let text = self
            .attachments
            .rewrite_body(record.body(), self.source)
            .await;
        let unresolved_attachments = !find_upload_references(&text).is_empty();

        let text = match record.as_real() {
            Some(real) => with_back_reference(&text, &real.web_url),
            None => text,
        };
        PreparedBody {
            text,
            unresolved_attachments,
        }
    }

    /// Target milestone numbers by title, loaded from the target on first use.
    async fn milestone_numbers(&mut self) -> Result<NumberingMap, MigrationError> {
        if let Some(numbers) = &self.milestone_numbers {
            return Ok(numbers.clone());
        }
        let numbers = NumberingMap::from_target(&self.target.list_milestones().await?);
        self.milestone_numbers = Some(numbers.clone());
        Ok(numbers)
    }

    /// Copies the notes of a fetched record as comments on `number`.
    ///
    /// Failures are logged and counted; they never abort the run.
    async fn migrate_comments(&mut self, record: &Record, number: u64) {
        if !self.settings.transfer.comments {
            return;
        }
        let Some(real) = record.as_real() else {
            return;
        };

        let notes = match real.kind {
            EntityKind::Issue => self.source.fetch_issue_notes(real.iid).await,
            EntityKind::MergeRequest => self.source.fetch_merge_request_notes(real.iid).await,
            EntityKind::Milestone => return,
        };
        let notes = match notes {
            Ok(notes) => notes,
            Err(e) => {
                warn!(iid = real.iid, error = %e, "Failed to fetch comments, skipping them");
                return;
            }
        };

        for note in &notes {
            let text = self.attachments.rewrite_body(&note.body, self.source).await;
            let body = comment_body(note, &text, &self.settings.usermap);
            match self.target.create_comment(number, &body).await {
                Ok(()) => self.summary.comments += 1,
                Err(e) => {
                    warn!(iid = real.iid, number, error = %e, "Failed to create comment");
                    self.summary.comments_failed += 1;
                }
            }
        }
    }
}
