//! Issue phase.

use super::{MigrationError, Migrator};
use crate::matcher::find_existing;
use crate::placeholders::{fill_gaps_with, NumberingMap};
use crate::platform::{IssueDraft, PlatformError, SourcePlatform, TargetPlatform};
use crate::records::{EntityKind, Record, TargetRecord};
use crate::summary::RecordOutcome;
use tracing::{error, info, warn};

impl<S, T> Migrator<'_, S, T>
where
    S: SourcePlatform + ?Sized,
    T: TargetPlatform + ?Sized,
{
    /// Migrates issues so that target numbers equal source iids.
    ///
    /// Confidential issues are redacted and, when enabled, numbering gaps
    /// are filled with placeholders. Issues found on the target only have
    /// their state mirrored.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::ReplacementCreation`] if an issue and its
    /// replacement both fail, or a platform error if issues cannot be listed.
    pub async fn migrate_issues(&mut self) -> Result<(), MigrationError> {
        info!("Transferring issues");

        let filter = self.record_filter();
        let mut records: Vec<Record> = self
            .source
            .fetch_issues(&filter)
            .await?
            .into_iter()
            .map(Record::from)
            .collect();
        records.sort_by_key(Record::iid);
        records.dedup_by_key(|r| r.iid());

        if self.settings.use_placeholder_issues_for_missing_issues {
            records = fill_gaps_with(
                records,
                |idx, _| Record::placeholder(EntityKind::Issue, idx),
                |idx, _| info!(iid = idx, "Added placeholder issue"),
            );
        }

        let existing = self.target.list_issues().await?;
        let milestones = self.milestone_numbers().await?;
        info!(count = records.len(), "Transferring issues");

        for record in &records {
            let outcome = self.migrate_issue(record, &existing, &milestones).await?;
            self.summary.issues.record(&outcome);
        }

        let counters = &self.summary.issues;
        info!(
            total = records.len(),
            placeholders = counters.placeholders,
            replacements = counters.replacements,
            failures = counters.failed,
            "Finished issues: {} placeholders created, {} replacements created, {} failures",
            counters.placeholders,
            counters.replacements,
            counters.failed
        );
        Ok(())
    }

    async fn migrate_issue(
        &mut self,
        record: &Record,
        existing: &[TargetRecord],
        milestones: &NumberingMap,
    ) -> Result<RecordOutcome, MigrationError> {
        let iid = record.iid();
        let title = record.title();

        let replacement_match = || {
            self.settings
                .use_replacement_issues_for_creation_fails
                .then(|| find_existing(&Record::replacement(record), existing))
                .flatten()
        };
        if let Some(found) = find_existing(record, existing).or_else(replacement_match) {
            info!(
                iid,
                title,
                number = found.number,
                "Issue already migrated, updating state"
            );
            if let Err(e) = self.target.update_state(found, record.state()).await {
                warn!(iid, title, error = %e, "Failed to update issue state");
            }
            return Ok(RecordOutcome::Existing {
                number: found.number,
            });
        }

        info!(iid, title, "Migrating issue");
        let error = match self.create_issue(record, milestones).await {
            Ok(created) if record.is_placeholder() => {
                return Ok(RecordOutcome::Placeholder {
                    number: created.number,
                })
            }
            Ok(created) => {
                return Ok(RecordOutcome::Created {
                    number: created.number,
                })
            }
            Err(e) => e,
        };

        error!(iid, title, error = %error, "Failed to create issue");
        if !self.settings.use_replacement_issues_for_creation_fails {
            return Ok(RecordOutcome::Failed {
                error: error.to_string(),
            });
        }

        info!(iid, title, "Creating replacement issue");
        let replacement = Record::replacement(record);
        match self.create_issue(&replacement, milestones).await {
            Ok(created) => Ok(RecordOutcome::Replacement {
                number: created.number,
            }),
            Err(source) => Err(MigrationError::ReplacementCreation {
                iid,
                title: title.to_string(),
                source,
            }),
        }
    }

    async fn create_issue(
        &mut self,
        record: &Record,
        milestones: &NumberingMap,
    ) -> Result<TargetRecord, PlatformError> {
        let body = self.prepare_body(record).await;
        let draft = IssueDraft {
            title: record.title().to_string(),
            body: body.text,
            state: record.state(),
            labels: self.record_labels(record, body.unresolved_attachments),
            milestone: record
                .milestone()
                .and_then(|m| milestones.number_for_title(&m.title)),
        };

        let created = self.target.create_issue(&draft).await?;
        self.migrate_comments(record, created.number).await;
        Ok(created)
    }
}
