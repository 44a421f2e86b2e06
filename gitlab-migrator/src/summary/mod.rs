//! Run summary types and helpers.

mod migration_summary;
mod outcome;
mod run_summary;

pub use migration_summary::MigrationSummary;
pub use outcome::{EntityCounters, RecordOutcome};
pub use run_summary::{ProcessingResult, RunSummary};
