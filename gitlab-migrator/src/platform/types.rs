//! Data exchanged with the platform clients.

use crate::records::RecordState;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

/// A stream of attachment bytes downloaded from the source platform.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Filter applied when fetching issues and merge requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Only fetch records carrying this label.
    pub label: Option<String>,
}

/// A label on either platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    /// Label name.
    pub name: String,

    /// Colour as `#rrggbb` or `rrggbb`.
    pub color: String,

    /// Description, empty when none.
    pub description: String,
}

/// A release on the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Git tag the release points at.
    pub tag_name: String,

    /// Release name.
    pub name: String,

    /// Markdown description.
    pub description: String,

    /// Release date, used for ordering.
    pub released_at: Option<DateTime<Utc>>,
}

/// Data for creating an issue on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    /// Title.
    pub title: String,

    /// Markdown body, including the back-reference.
    pub body: String,

    /// State to leave the issue in after creation.
    pub state: RecordState,

    /// Label names.
    pub labels: Vec<String>,

    /// Target milestone number.
    pub milestone: Option<u64>,
}

/// Data for creating a pull request on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    /// Title.
    pub title: String,

    /// Markdown body, including the back-reference.
    pub body: String,

    /// Branch with the changes.
    pub head: String,

    /// Branch to merge into.
    pub base: String,

    /// Label names.
    pub labels: Vec<String>,

    /// Target milestone number.
    pub milestone: Option<u64>,
}

/// Data for creating a milestone on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneDraft {
    /// Title.
    pub title: String,

    /// Description.
    pub description: String,

    /// Open or closed.
    pub state: RecordState,
}

/// Data for creating a release on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDraft {
    /// Tag name.
    pub tag_name: String,

    /// Release name.
    pub name: String,

    /// Markdown body.
    pub body: String,
}
