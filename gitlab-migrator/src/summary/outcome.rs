//! Per-record outcomes and counters.

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Created on the target.
    Created { number: u64 },

    /// A placeholder was created in its slot.
    Placeholder { number: u64 },

    /// Creation failed and a replacement took its slot.
    Replacement { number: u64 },

    /// Already present on the target; only its state was mirrored.
    Existing { number: u64 },

    /// Deliberately left out.
    Skipped { reason: String },

    /// Creation failed and nothing took its place.
    Failed { error: String },
}

/// Outcome counts for one entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounters {
    /// Records created from source content.
    pub created: usize,

    /// Placeholders created.
    pub placeholders: usize,

    /// Replacements created.
    pub replacements: usize,

    /// Records found already migrated.
    pub existing: usize,

    /// Records left out on purpose.
    pub skipped: usize,

    /// Records that could not be migrated.
    pub failed: usize,
}

impl EntityCounters {
    /// Counts an outcome.
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Created { .. } => self.created += 1,
            RecordOutcome::Placeholder { .. } => self.placeholders += 1,
            RecordOutcome::Replacement { .. } => self.replacements += 1,
            RecordOutcome::Existing { .. } => self.existing += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Records that exist on the target after the run.
    #[must_use]
    pub fn on_target(&self) -> usize {
        self.created + self.placeholders + self.replacements + self.existing
    }

    /// Records this run added to the target.
    #[must_use]
    pub fn new_on_target(&self) -> usize {
        self.created + self.placeholders + self.replacements
    }
}
