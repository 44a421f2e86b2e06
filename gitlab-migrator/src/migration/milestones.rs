//! Milestone phase.

use super::{MigrationError, Migrator};
use crate::placeholders::align_milestones;
use crate::platform::{MilestoneDraft, SourcePlatform, TargetPlatform};
use crate::records::Record;
use crate::summary::RecordOutcome;
use tracing::{error, info};

impl<S, T> Migrator<'_, S, T>
where
    S: SourcePlatform + ?Sized,
    T: TargetPlatform + ?Sized,
{
    /// Creates missing milestones in aligned order.
    ///
    /// Milestones already on the target (by title) are left alone. A created
    /// milestone whose number differs from the expected one is logged and
    /// counted as a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if milestones cannot be listed on either side.
    pub async fn migrate_milestones(&mut self) -> Result<(), MigrationError> {
        info!("Transferring milestones");

        let records = self
            .source
            .fetch_milestones(self.settings.transfer.ancestor_milestones)
            .await?;
        let aligned = align_milestones(
            records.into_iter().map(Record::Real).collect(),
            self.settings.use_placeholder_milestones_for_missing_milestones,
        );
        let existing = self.target.list_milestones().await?;

        info!(
            count = aligned.milestones.len(),
            placeholders = aligned.placeholders,
            "Aligned milestones"
        );

        for milestone in &aligned.milestones {
            let iid = milestone.iid();
            let title = milestone.title();

            if let Some(found) = existing.iter().find(|m| m.title == title) {
                info!(iid, title, number = found.number, "Milestone already exists");
                self.summary
                    .milestones
                    .record(&RecordOutcome::Existing {
                        number: found.number,
                    });
                continue;
            }

            let description = self
                .attachments
                .rewrite_body(milestone.body(), self.source)
                .await;
            let draft = MilestoneDraft {
                title: title.to_string(),
                description,
                state: milestone.state(),
            };

            let outcome = match self.target.create_milestone(&draft).await {
                Ok(created) => {
                    let expected = aligned.numbering.get(iid).map(|slot| slot.number);
                    if expected == Some(created.number) {
                        info!(iid, title, number = created.number, "Created milestone");
                        if milestone.is_placeholder() {
                            RecordOutcome::Placeholder {
                                number: created.number,
                            }
                        } else {
                            RecordOutcome::Created {
                                number: created.number,
                            }
                        }
                    } else {
                        error!(
                            iid,
                            title,
                            number = created.number,
                            expected = ?expected,
                            "Milestone was created with an unexpected number"
                        );
                        RecordOutcome::Failed {
                            error: format!(
                                "expected number {expected:?}, got {}",
                                created.number
                            ),
                        }
                    }
                }
                Err(e) => {
                    error!(iid, title, error = %e, "Failed to create milestone");
                    RecordOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            self.summary.milestones.record(&outcome);
        }

        self.milestone_numbers = None;
        Ok(())
    }
}
