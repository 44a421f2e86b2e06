//! Release phase.

use super::{MigrationError, Migrator};
use crate::platform::{ReleaseDraft, SourcePlatform, TargetPlatform};
use tracing::{error, info};

impl<S, T> Migrator<'_, S, T>
where
    S: SourcePlatform + ?Sized,
    T: TargetPlatform + ?Sized,
{
    /// Creates missing releases, oldest first.
    ///
    /// A release is skipped when one with the same tag exists on the target.
    /// Only the tag, name and description are carried over.
    ///
    /// # Errors
    ///
    /// Returns an error if releases cannot be listed on either side.
    pub async fn migrate_releases(&mut self) -> Result<(), MigrationError> {
        info!("Transferring releases");

        let mut releases = self.source.fetch_releases().await?;
        releases.sort_by_key(|r| r.released_at);
        info!(count = releases.len(), "Fetched releases");

        for release in releases {
            let tag = release.tag_name.as_str();
            if self.target.release_exists(tag).await? {
                info!(tag, name = %release.name, "Release already exists");
                self.summary.releases.existing += 1;
                continue;
            }

            let body = self
                .attachments
                .rewrite_body(&release.description, self.source)
                .await;
            let draft = ReleaseDraft {
                tag_name: release.tag_name.clone(),
                name: release.name.clone(),
                body,
            };

            match self.target.create_release(&draft).await {
                Ok(()) => {
                    info!(tag, name = %release.name, "Created release");
                    self.summary.releases.created += 1;
                }
                Err(e) => {
                    error!(tag, name = %release.name, error = %e, "Failed to create release");
                    self.summary.releases.failed += 1;
                }
            }
        }
        Ok(())
    }
}
