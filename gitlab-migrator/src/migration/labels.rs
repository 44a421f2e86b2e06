//! Label phase.

use super::{sanitize_label_description, synthetic_labels, MigrationError, Migrator};
use crate::platform::{SourcePlatform, TargetPlatform};
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl<S, T> Migrator<'_, S, T>
where
    S: SourcePlatform + ?Sized,
    T: TargetPlatform + ?Sized,
{
    /// Creates the project's labels plus the synthetic ones.
    ///
    /// Labels whose name already exists on the target are skipped. Failures
    /// are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns an error if labels cannot be listed on either side.
    pub async fn migrate_labels(&mut self) -> Result<(), MigrationError> {
        info!("Transferring labels");

        let mut labels = self.source.fetch_labels().await?;
        labels.extend(synthetic_labels());

        let mut existing: HashSet<String> =
            self.target.list_label_names().await?.into_iter().collect();

        for mut label in labels {
            label.name = self.label_name(&label.name);
            if existing.contains(&label.name) {
                debug!(name = %label.name, "Label already exists");
                self.summary.labels.existing += 1;
                continue;
            }

            let description = sanitize_label_description(
                &label.description,
                self.settings.trim_oversized_label_descriptions,
            );
            if description != label.description.trim() {
                warn!(
                    name = %label.name,
                    original = %label.description,
                    "Adjusted label description GitHub would reject"
                );
            }
            label.description = description;

            match self.target.create_label(&label).await {
                Ok(()) => {
                    info!(name = %label.name, "Created label");
                    self.summary.labels.created += 1;
                }
                Err(e) => {
                    warn!(name = %label.name, error = %e, "Failed to create label");
                    self.summary.labels.failed += 1;
                }
            }
            existing.insert(label.name);
        }
        Ok(())
    }
}
