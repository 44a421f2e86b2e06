//! Summary of one project migration.

use super::EntityCounters;

/// Counters and flags collected while migrating one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// GitLab project id.
    pub project_id: u64,

    /// GitHub `owner/repo`.
    pub repository: String,

    /// Whether the description was copied.
    pub description_transferred: bool,

    /// Milestone outcomes; mismatched numbers count as failures.
    pub milestones: EntityCounters,

    /// Label outcomes.
    pub labels: EntityCounters,

    /// Release outcomes.
    pub releases: EntityCounters,

    /// Issue outcomes.
    pub issues: EntityCounters,

    /// Merge request outcomes.
    pub merge_requests: EntityCounters,

    /// Comments copied.
    pub comments: usize,

    /// Comments that could not be copied.
    pub comments_failed: usize,

    /// Merge requests written to the log file instead of being migrated.
    pub merge_requests_logged: Option<usize>,

    /// Attachments rehomed.
    pub attachments: usize,

    /// Whether all attachment writes finished before the drain timeout.
    pub attachments_drained: bool,
}

impl MigrationSummary {
    /// Creates an empty summary for a project.
    #[must_use]
    pub fn new(project_id: u64, repository: impl Into<String>) -> Self {
        Self {
            project_id,
            repository: repository.into(),
            attachments_drained: true,
            ..Default::default()
        }
    }

    /// Total failures across entity types.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.milestones.failed
            + self.labels.failed
            + self.releases.failed
            + self.issues.failed
            + self.merge_requests.failed
            + self.comments_failed
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures() > 0 || !self.attachments_drained
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_summary_is_successful() {
        let summary = MigrationSummary::new(42, "acme/widgets");
        assert!(summary.all_success());
        assert_eq!(summary.failures(), 0);
    }

    #[test]
    fn failed_records_and_undrained_writes_are_failures() {
        let mut summary = MigrationSummary::new(42, "acme/widgets");
        summary.labels.failed = 1;
        assert!(summary.has_failures());

        let mut summary = MigrationSummary::new(42, "acme/widgets");
        summary.attachments_drained = false;
        assert!(summary.has_failures());
    }
}
