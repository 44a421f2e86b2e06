//! Source and target record types.
//!
//! A [`Record`] is what the migration walks over: either a record fetched
//! from GitLab or one of the synthetic stand-ins the migration inserts to keep
//! numbering aligned. All variants share the same accessor surface.

mod kind;
mod record;
mod source;
mod state;
mod target;

pub use kind::EntityKind;
pub use record::{Record, SyntheticRecord};
pub use source::{BranchPair, MilestoneRef, Note, SourceRecord};
pub use state::RecordState;
pub use target::{TargetMilestone, TargetRecord};
