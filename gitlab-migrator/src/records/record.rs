//! The record variants walked by the migration.

use super::{EntityKind, MilestoneRef, RecordState, SourceRecord};
use chrono::{DateTime, Utc};

/// Fields of a record the migration synthesized instead of fetching.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticRecord {
    /// Entity type.
    pub kind: EntityKind,

    /// Number slot this record occupies.
    pub iid: u64,

    /// Synthesized title.
    pub title: String,

    /// Synthesized body.
    pub body: String,

    /// State to create the record in.
    pub state: RecordState,

    /// Creation timestamp carried over from the original, if any.
    pub created_at: Option<DateTime<Utc>>,

    /// URL of the source record this stands in for, if one exists.
    pub original_url: Option<String>,
}

enum View<'a> {
    Real(&'a SourceRecord),
    Synthetic(&'a SyntheticRecord),
}

/// A record in an aligned sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Fetched from the source platform and migrated as is.
    Real(SourceRecord),

    /// Fills a numbering gap left by a deleted record.
    Placeholder(SyntheticRecord),

    /// Stands in for a confidential record whose content must not leak.
    RedactedConfidential(SyntheticRecord),

    /// Substitutes a record whose creation failed.
    Replacement(SyntheticRecord),
}

impl Record {
    /// Synthesizes a gap placeholder for `iid`.
    #[must_use]
    pub fn placeholder(kind: EntityKind, iid: u64) -> Self {
        let noun = kind.noun();
        Self::Placeholder(SyntheticRecord {
            kind,
            iid,
            title: format!("[PLACEHOLDER] - for {noun} #{iid}"),
            body: format!(
                "This {noun} has no counterpart on GitLab. It was created so that {noun} \
                 numbers on GitLab and GitHub stay identical and cross references keep \
                 working. It can be deleted once the migration is complete."
            ),
            state: RecordState::Closed,
            created_at: None,
            original_url: None,
        })
    }

    /// Replaces a confidential record with a redacted placeholder in its slot.
    ///
    /// Only the number and the link to the original survive.
    #[must_use]
    pub fn redact(source: SourceRecord) -> Self {
        let noun = source.kind.noun();
        let iid = source.iid;
        Self::RedactedConfidential(SyntheticRecord {
            kind: source.kind,
            iid,
            title: format!("[PLACEHOLDER] - for confidential {noun} #{iid}"),
            body: format!(
                "This {noun} is confidential on GitLab and was excluded from the migration \
                 to avoid leaking its content. It only keeps {noun} numbers on GitLab and \
                 GitHub identical and can be deleted once the migration is complete.\n\n{}",
                source.web_url
            ),
            state: RecordState::Closed,
            created_at: source.created_at,
            original_url: Some(source.web_url),
        })
    }

    /// Synthesizes a replacement for a record whose creation failed.
    ///
    /// The replacement keeps the number, state and creation time, suffixes the
    /// title and explains in its body what happened.
    #[must_use]
    pub fn replacement(original: &Record) -> Self {
        let noun = original.kind().noun();
        let mut body = format!(
            "The original {noun}\n\n\tId: {}\n\tTitle: {}\n\ncould not be created.\n\
             This {noun} replaces it.",
            original.iid(),
            original.title()
        );
        if let Some(url) = original.web_url() {
            body.push_str(&format!(
                "\n\nIf the GitLab project still exists, the original is available at:\n\n{url}"
            ));
        }

        Self::Replacement(SyntheticRecord {
            kind: original.kind(),
            iid: original.iid(),
            title: format!("{} [REPLACEMENT ISSUE]", original.title()),
            body,
            state: original.state(),
            created_at: original.created_at(),
            original_url: original.web_url().map(str::to_string),
        })
    }

    fn view(&self) -> View<'_> {
        match self {
            Self::Real(r) => View::Real(r),
            Self::Placeholder(s) | Self::RedactedConfidential(s) | Self::Replacement(s) => {
                View::Synthetic(s)
            }
        }
    }

    /// Entity type.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self.view() {
            View::Real(r) => r.kind,
            View::Synthetic(s) => s.kind,
        }
    }

    /// Number slot.
    #[must_use]
    pub fn iid(&self) -> u64 {
        match self.view() {
            View::Real(r) => r.iid,
            View::Synthetic(s) => s.iid,
        }
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self.view() {
            View::Real(r) => &r.title,
            View::Synthetic(s) => &s.title,
        }
    }

    /// Body.
    #[must_use]
    pub fn body(&self) -> &str {
        match self.view() {
            View::Real(r) => &r.body,
            View::Synthetic(s) => &s.body,
        }
    }

    /// State.
    #[must_use]
    pub fn state(&self) -> RecordState {
        match self.view() {
            View::Real(r) => r.state,
            View::Synthetic(s) => s.state,
        }
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.view() {
            View::Real(r) => r.created_at,
            View::Synthetic(s) => s.created_at,
        }
    }

    /// URL of the source record, used as the back-reference on the target.
    #[must_use]
    pub fn web_url(&self) -> Option<&str> {
        match self.view() {
            View::Real(r) => Some(&r.web_url),
            View::Synthetic(s) => s.original_url.as_deref(),
        }
    }

    /// Labels; synthetic records have none.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        match self {
            Self::Real(r) => &r.labels,
            _ => &[],
        }
    }

    /// Milestone reference; synthetic records have none.
    #[must_use]
    pub fn milestone(&self) -> Option<&MilestoneRef> {
        match self {
            Self::Real(r) => r.milestone.as_ref(),
            _ => None,
        }
    }

    /// The fetched record, for [`Record::Real`].
    #[must_use]
    pub fn as_real(&self) -> Option<&SourceRecord> {
        match self {
            Self::Real(r) => Some(r),
            _ => None,
        }
    }

    /// True for gap placeholders and redacted confidential records.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_) | Self::RedactedConfidential(_))
    }
}

impl From<SourceRecord> for Record {
    /// Wraps a fetched record, redacting it when it is confidential.
    fn from(source: SourceRecord) -> Self {
        if source.confidential {
            Self::redact(source)
        } else {
            Self::Real(source)
        }
    }
}
