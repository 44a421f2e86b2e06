//! Stable identifiers derived from repository URLs and attachment content.
//!
//! Everything in here is a pure function: identical inputs always produce
//! identical identifiers, across runs and across machines.

use sha2::{Digest, Sha256};

/// Normalises a repository URL so that equivalent spellings hash identically.
///
/// Surrounding whitespace, trailing slashes and an existing `.git` suffix are
/// removed, the URL is lower-cased and `.git` is appended again.
#[must_use]
pub fn canonical_repository_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let lowered = trimmed.to_lowercase();
    let without_suffix = lowered
        .strip_suffix(".git")
        .unwrap_or(&lowered)
        .trim_end_matches('/');
    format!("{without_suffix}.git")
}

/// Builds the canonical GitHub clone URL for `owner/repo`.
#[must_use]
pub fn github_repository_url(owner: &str, repo: &str) -> String {
    canonical_repository_url(&format!("https://github.com/{owner}/{repo}"))
}

/// Derives the repository identifier used to group attachments.
///
/// This is the hex MD5 digest of the canonical repository URL.
#[must_use]
pub fn repository_id(repo_url: &str) -> String {
    format!("{:x}", md5::compute(canonical_repository_url(repo_url)))
}

/// Hex SHA-256 digest of arbitrary bytes.
#[must_use]
pub fn content_key(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_url_always_ends_in_git() {
        assert_eq!(
            canonical_repository_url("https://github.com/acme/widgets"),
            "https://github.com/acme/widgets.git"
        );
        assert_eq!(
            canonical_repository_url("https://github.com/acme/widgets.git"),
            "https://github.com/acme/widgets.git"
        );
        assert_eq!(
            canonical_repository_url("https://github.com/acme/widgets.git/"),
            "https://github.com/acme/widgets.git"
        );
    }

    #[test]
    fn repository_id_ignores_case_and_trailing_slash() {
        let a = repository_id("https://github.com/Acme/Widgets");
        let b = repository_id("https://github.com/acme/widgets.git/");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn repository_id_differs_between_repositories() {
        assert_ne!(
            repository_id(&github_repository_url("acme", "widgets")),
            repository_id(&github_repository_url("acme", "gadgets"))
        );
    }

    #[test]
    fn content_key_is_sha256_hex() {
        assert_eq!(
            content_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_key("/uploads/a/b.png").len(), 64);
    }
}
