//! Text composed for records created on the target.

use crate::platform::Label;
use crate::records::Note;
use std::collections::BTreeMap;

/// Label added to records whose attachments could not be rehomed.
pub const HAS_ATTACHMENT_LABEL: &str = "has attachment";

/// Label added to merge requests migrated as issues.
pub const MERGE_REQUEST_LABEL: &str = "Merge Request from Gitlab";

/// GitHub rejects label descriptions longer than this.
pub const MAX_LABEL_DESCRIPTION: usize = 100;

/// Labels created on every target next to the project's own.
#[must_use]
pub fn synthetic_labels() -> [Label; 2] {
    [
        Label {
            name: HAS_ATTACHMENT_LABEL.to_string(),
            color: "#fbca04".to_string(),
            description: "Attachment was not transfered from GitLab".to_string(),
        },
        Label {
            name: MERGE_REQUEST_LABEL.to_string(),
            color: "#b36b00".to_string(),
            description: String::new(),
        },
    ]
}

/// Appends the link back to the source record.
///
/// Re-runs recognise migrated records by this link.
#[must_use]
pub fn with_back_reference(body: &str, web_url: &str) -> String {
    let body = body.trim_end();
    if body.is_empty() {
        format!("*Migrated from GitLab: {web_url}*")
    } else {
        format!("{body}\n\n---\n\n*Migrated from GitLab: {web_url}*")
    }
}

/// Renders a GitLab username, as a GitHub mention when it is mapped.
#[must_use]
pub fn mention(username: &str, usermap: &BTreeMap<String, String>) -> String {
    usermap
        .get(username)
        .map_or_else(|| username.to_string(), |login| format!("@{login}"))
}

/// Body of a comment copied from a GitLab note.
///
/// `body` is the note text after attachment rewriting.
#[must_use]
pub fn comment_body(note: &Note, body: &str, usermap: &BTreeMap<String, String>) -> String {
    let author = mention(&note.author, usermap);
    match note.created_at {
        Some(at) => format!(
            "**{author}** commented on {}:\n\n{body}",
            at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("**{author}** commented:\n\n{body}"),
    }
}

/// Makes a label description acceptable to GitHub.
///
/// Characters outside the Basic Multilingual Plane and emoji are removed.
/// Descriptions still over [`MAX_LABEL_DESCRIPTION`] characters are trimmed
/// when `trim_oversized` is set and dropped otherwise.
#[must_use]
pub fn sanitize_label_description(description: &str, trim_oversized: bool) -> String {
    let cleaned: String = description.chars().filter(|c| !is_emoji(*c)).collect();
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= MAX_LABEL_DESCRIPTION {
        return cleaned.to_string();
    }
    if trim_oversized {
        let trimmed: String = cleaned.chars().take(MAX_LABEL_DESCRIPTION).collect();
        trimmed.trim().to_string()
    } else {
        String::new()
    }
}

fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1_0000..=0x10_FFFF | 0x2600..=0x27BF | 0xFE0E..=0xFE0F | 0x200D | 0x20E3
    )
}
