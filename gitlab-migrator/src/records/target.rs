//! Records that already exist on the target platform.

/// An issue or pull request on the target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRecord {
    /// Target-assigned number.
    pub number: u64,

    /// Title.
    pub title: String,

    /// Body, empty when the target has none.
    pub body: String,

    /// Whether the record is open.
    pub open: bool,

    /// Whether this is a pull request rather than a plain issue.
    pub is_pull_request: bool,
}

/// A milestone on the target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMilestone {
    /// Target-assigned number.
    pub number: u64,

    /// Title.
    pub title: String,
}
