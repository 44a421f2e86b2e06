//! Merge request phase and merge request log mode.

use super::{MigrationError, Migrator, MERGE_REQUEST_LABEL};
use crate::matcher::{
    find_existing_merge_request, merge_request_issue_title, ExistingMergeRequest,
};
use crate::placeholders::NumberingMap;
use crate::platform::{
    IssueDraft, PlatformError, PullRequestDraft, SourcePlatform, TargetPlatform,
};
use crate::records::{Note, Record, SourceRecord, TargetRecord};
use crate::summary::RecordOutcome;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

/// A merge request as written by log mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMergeRequest {
    /// The merge request.
    #[serde(flatten)]
    pub record: SourceRecord,

    /// Its comments.
    pub notes: Vec<Note>,
}

/// Top-level shape of the merge request log file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequestLog {
    /// Merge requests ordered by iid.
    pub merge_requests: Vec<LoggedMergeRequest>,
}

impl<S, T> Migrator<'_, S, T>
where
    S: SourcePlatform + ?Sized,
    T: TargetPlatform + ?Sized,
{
    /// Migrates merge requests, or logs them when a log file is configured.
    ///
    /// An open merge request whose branches both exist on the target becomes
    /// a pull request; every other one becomes an issue. Existing pull
    /// requests have their state mirrored, existing issues are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::MergeRequestCreation`] on the first merge
    /// request that cannot be created.
    pub async fn migrate_merge_requests(&mut self) -> Result<(), MigrationError> {
        if !self.source.merge_requests_enabled().await {
            warn!("Merge requests are disabled for this project, skipping them");
            return Ok(());
        }
        let settings = self.settings;
        if let Some(path) = &settings.log_merge_requests {
            return self.log_merge_requests(path).await;
        }

        info!("Transferring merge requests");

        let filter = self.record_filter();
        let mut records: Vec<Record> = self
            .source
            .fetch_merge_requests(&filter)
            .await?
            .into_iter()
            .map(Record::from)
            .collect();
        records.sort_by_key(Record::iid);

        let pull_requests = self.target.list_pull_requests().await?;
        let issues = self.target.list_issues().await?;
        let milestones = self.milestone_numbers().await?;
        let skipped_states = self.settings.skipped_merge_request_states();
        info!(count = records.len(), "Transferring merge requests");

        for record in &records {
            let iid = record.iid();
            let title = record.title();

            let outcome = match find_existing_merge_request(record, &pull_requests, &issues) {
                Some(ExistingMergeRequest::PullRequest(found)) => {
                    info!(
                        iid,
                        title,
                        number = found.number,
                        "Merge request already exists as pull request"
                    );
                    if let Err(e) = self.target.update_state(found, record.state()).await {
                        warn!(iid, title, error = %e, "Failed to update pull request state");
                    }
                    RecordOutcome::Existing {
                        number: found.number,
                    }
                }
                Some(ExistingMergeRequest::Issue(found)) => {
                    info!(
                        iid,
                        title,
                        number = found.number,
                        "Merge request already exists as issue"
                    );
                    RecordOutcome::Existing {
                        number: found.number,
                    }
                }
                None if skipped_states.contains(&record.state()) => {
                    info!(
                        iid,
                        title,
                        state = record.state().as_gitlab_str(),
                        "Skipping merge request"
                    );
                    RecordOutcome::Skipped {
                        reason: format!("state {}", record.state().as_gitlab_str()),
                    }
                }
                None => {
                    info!(iid, title, "Creating merge request");
                    let created = self
                        .create_merge_request(record, &milestones)
                        .await
                        .map_err(|source| {
                            error!(iid, title, error = %source, "Failed to create merge request");
                            MigrationError::MergeRequestCreation {
                                iid,
                                title: title.to_string(),
                                source,
                            }
                        })?;
                    RecordOutcome::Created {
                        number: created.number,
                    }
                }
            };
            self.summary.merge_requests.record(&outcome);
        }
        Ok(())
    }

    async fn create_merge_request(
        &mut self,
        record: &Record,
        milestones: &NumberingMap,
    ) -> Result<TargetRecord, PlatformError> {
        let body = self.prepare_body(record).await;
        let mut labels = self.record_labels(record, body.unresolved_attachments);
        let milestone = record
            .milestone()
            .and_then(|m| milestones.number_for_title(&m.title));

        let branches = match record.as_real().and_then(|r| r.branches.as_ref()) {
            Some(branches)
                if !self.settings.use_issues_for_all_merge_requests
                    && record.state().is_open() =>
            {
                let present = self.target.branch_exists(&branches.source).await?
                    && self.target.branch_exists(&branches.target).await?;
                present.then_some(branches)
            }
            _ => None,
        };

        let created = match branches {
            Some(branches) => {
                let draft = PullRequestDraft {
                    title: record.title().to_string(),
                    body: body.text,
                    head: branches.source.clone(),
                    base: branches.target.clone(),
                    labels,
                    milestone,
                };
                self.target.create_pull_request(&draft).await?
            }
            None => {
                labels.push(self.label_name(MERGE_REQUEST_LABEL));
                let draft = IssueDraft {
                    title: merge_request_issue_title(record.title(), record.state()),
                    body: body.text,
                    state: record.state(),
                    labels,
                    milestone,
                };
                self.target.create_issue(&draft).await?
            }
        };

        self.migrate_comments(record, created.number).await;
        Ok(created)
    }

    /// Writes merge requests and their comments to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if merge requests cannot be fetched or the file
    /// cannot be written.
    pub async fn log_merge_requests(&mut self, path: &Path) -> Result<(), MigrationError> {
        info!(path = %path.display(), "Logging merge requests");

        let filter = self.record_filter();
        let mut records = self.source.fetch_merge_requests(&filter).await?;
        records.sort_by_key(|r| r.iid);

        let mut merge_requests = Vec::with_capacity(records.len());
        for record in records {
            let notes = match self.source.fetch_merge_request_notes(record.iid).await {
                Ok(notes) => notes,
                Err(e) => {
                    warn!(
                        iid = record.iid,
                        error = %e,
                        "Failed to fetch comments, logging without them"
                    );
                    Vec::new()
                }
            };
            merge_requests.push(LoggedMergeRequest { record, notes });
        }

        let count = merge_requests.len();
        let json = serde_json::to_string_pretty(&MergeRequestLog { merge_requests })?;

        let io_error = |source: std::io::Error| MigrationError::MergeRequestLog {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(path, json).await.map_err(io_error)?;

        info!(path = %path.display(), count, "Logged merge requests");
        self.summary.merge_requests_logged = Some(count);
        Ok(())
    }
}
