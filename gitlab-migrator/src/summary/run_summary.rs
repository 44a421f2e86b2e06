//! Run summary types.

use super::MigrationSummary;

/// Result of migrating a single project.
#[derive(Debug, Clone)]
pub enum ProcessingResult {
    /// The migration ran to completion, possibly with recoverable failures.
    Completed(MigrationSummary),

    /// The migration was aborted.
    Aborted {
        /// GitLab project id.
        project_id: u64,
        /// GitHub `owner/repo`.
        repository: String,
        /// Error message.
        error: String,
    },
}

/// Summary of a complete run over one or more projects.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Per-project results in processing order.
    pub results: Vec<ProcessingResult>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project result.
    pub fn record_result(&mut self, result: ProcessingResult) {
        self.results.push(result);
    }

    /// Number of projects that ran to completion.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, ProcessingResult::Completed(_)))
            .count()
    }

    /// Number of aborted projects.
    #[must_use]
    pub fn aborted(&self) -> usize {
        self.results.len() - self.completed()
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| match r {
            ProcessingResult::Completed(summary) => summary.has_failures(),
            ProcessingResult::Aborted { .. } => true,
        })
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
    fn can_record_result() {
        let mut summary = RunSummary::new();

        summary.record_result(ProcessingResult::Completed(MigrationSummary::new(
            1,
            "acme/widgets",
        )));
        assert!(summary.all_success());

        summary.record_result(ProcessingResult::Aborted {
            project_id: 2,
            repository: "acme/gadgets".to_string(),
            error: "target not empty".to_string(),
        });
        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.aborted(), 1);
        assert!(summary.has_failures());
    }
}
