//! Detection of records migrated by an earlier run.
//!
//! A target record counts as the migrated form of a source record when its
//! title matches and its body carries the source record's URL. Requiring both
//! avoids treating an unrelated record with the same title as a match, and
//! avoids trusting a record from an interrupted run that never received its
//! back-reference.

use crate::records::{Record, RecordState, TargetRecord};

/// How an existing merge request was found on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingMergeRequest<'a> {
    /// Migrated as a pull request.
    PullRequest(&'a TargetRecord),

    /// Migrated as a plain issue.
    Issue(&'a TargetRecord),
}

/// Finds the target record a source record was already migrated to.
///
/// If several target records qualify, the first one wins. Records without a
/// source URL (gap placeholders) match on title alone.
#[must_use]
pub fn find_existing<'a>(source: &Record, targets: &'a [TargetRecord]) -> Option<&'a TargetRecord> {
    let title = source.title().trim();
    targets
        .iter()
        .find(|target| target.title.trim() == title && carries_back_reference(source, target))
}

/// Finds an existing migration of a merge request.
///
/// Pull requests are checked first with the regular rule. Plain issues match
/// either with the regular rule or when titled `"{title} - [merged]"` or
/// `"{title} - [closed]"`, the form used when a merge request is migrated as
/// an issue.
#[must_use]
pub fn find_existing_merge_request<'a>(
    source: &Record,
    pull_requests: &'a [TargetRecord],
    issues: &'a [TargetRecord],
) -> Option<ExistingMergeRequest<'a>> {
    if let Some(pr) = find_existing(source, pull_requests) {
        return Some(ExistingMergeRequest::PullRequest(pr));
    }

    let title = source.title().trim();
    let merged = format!("{title} - [merged]");
    let closed = format!("{title} - [closed]");

    issues
        .iter()
        .filter(|issue| !issue.is_pull_request)
        .find(|issue| {
            let issue_title = issue.title.trim();
            (issue_title == title || issue_title == merged || issue_title == closed)
                && carries_back_reference(source, issue)
        })
        .map(ExistingMergeRequest::Issue)
}

/// Title for a merge request that is migrated as a plain issue.
///
/// Merged and closed merge requests are suffixed so the secondary match rule
/// of [`find_existing_merge_request`] recognises them; open ones keep their
/// title.
#[must_use]
pub fn merge_request_issue_title(title: &str, state: RecordState) -> String {
    let title = title.trim();
    match state {
        RecordState::Merged => format!("{title} - [merged]"),
        RecordState::Closed => format!("{title} - [closed]"),
        RecordState::Open => title.to_string(),
    }
}

fn carries_back_reference(source: &Record, target: &TargetRecord) -> bool {
    source
        .web_url()
        .map_or(true, |url| target.body.contains(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{EntityKind, SourceRecord};

    const URL: &str = "https://gitlab.test/acme/widgets/-/issues/3";

    fn source(title: &str) -> Record {
        Record::Real(SourceRecord::new(
            EntityKind::Issue,
            3,
            title,
            RecordState::Open,
            URL,
        ))
    }

    fn target(number: u64, title: &str, body: &str, is_pull_request: bool) -> TargetRecord {
        TargetRecord {
            number,
            title: title.to_string(),
            body: body.to_string(),
            open: true,
            is_pull_request,
        }
    }

    #[test]
    fn matches_on_title_and_back_reference() {
        let targets = vec![target(3, " Crash on start ", &format!("text\n\n{URL}"), false)];
        let found = find_existing(&source("Crash on start"), &targets);
        assert_eq!(found.map(|t| t.number), Some(3));
    }

    #[test]
    fn title_collision_without_back_reference_is_not_a_match() {
        let targets = vec![target(3, "Crash on start", "unrelated", false)];
        assert!(find_existing(&source("Crash on start"), &targets).is_none());
    }

    #[test]
    fn back_reference_with_different_title_is_not_a_match() {
        let targets = vec![target(3, "Other", URL, false)];
        assert!(find_existing(&source("Crash on start"), &targets).is_none());
    }

    #[test]
    fn first_match_wins() {
        let targets = vec![
            target(3, "Crash on start", URL, false),
            target(8, "Crash on start", URL, false),
        ];
        assert_eq!(
            find_existing(&source("Crash on start"), &targets).map(|t| t.number),
            Some(3)
        );
    }

    #[test]
    fn placeholders_match_on_title_alone() {
        let placeholder = Record::placeholder(EntityKind::Issue, 2);
        let targets = vec![target(2, "[PLACEHOLDER] - for issue #2", "anything", false)];
        assert!(find_existing(&placeholder, &targets).is_some());
    }

    #[test]
    fn merge_request_found_as_pull_request() {
        let pulls = vec![target(5, "Add feature", URL, true)];
        let found = find_existing_merge_request(&source("Add feature"), &pulls, &[]);
        assert!(matches!(found, Some(ExistingMergeRequest::PullRequest(t)) if t.number == 5));
    }

    #[test]
    fn merge_request_found_as_suffixed_issue() {
        let issues = vec![
            target(4, "Add feature - [merged]", URL, true),
            target(6, "Add feature - [merged]", URL, false),
        ];
        let found = find_existing_merge_request(&source("Add feature"), &[], &issues);
        assert!(matches!(found, Some(ExistingMergeRequest::Issue(t)) if t.number == 6));

        let closed = vec![target(7, "Add feature - [closed]", URL, false)];
        assert!(find_existing_merge_request(&source("Add feature"), &[], &closed).is_some());
    }

    #[test]
    fn suffixed_issue_requires_back_reference() {
        let issues = vec![target(6, "Add feature - [merged]", "no link", false)];
        assert!(find_existing_merge_request(&source("Add feature"), &[], &issues).is_none());
    }

    #[test]
    fn builds_issue_titles_for_merge_requests() {
        assert_eq!(
            merge_request_issue_title("Fix ", RecordState::Merged),
            "Fix - [merged]"
        );
        assert_eq!(
            merge_request_issue_title("Fix", RecordState::Closed),
            "Fix - [closed]"
        );
        assert_eq!(merge_request_issue_title("Fix", RecordState::Open), "Fix");
    }
}
