//! Deterministic destinations for rehomed attachments.

use crate::hashing::{content_key, repository_id};
use std::path::{Path, PathBuf};

/// Where attachment bytes end up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Bytes are written below the output root and later committed to the
    /// target repository under the attachment tag.
    #[default]
    LocalDisk,

    /// Bytes are staged below the output root and served from an S3 bucket.
    ObjectStorage {
        /// Bucket name.
        bucket: String,

        /// Bucket region; selects the path-style URL when set.
        region: Option<String>,
    },
}

/// Every identifier and path derived for one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLocation {
    /// Hash of the canonical target repository URL.
    pub repo_id: String,

    /// Target repository clone URL.
    pub repo_url: String,

    /// Tag that groups all attachments of the target repository.
    pub unique_git_tag: String,

    /// Public URL the rewritten reference points at.
    pub attachment_url: String,

    /// Logical path in the target's asset namespace (object key for S3).
    pub target_path: String,

    /// Where the bytes are written locally.
    pub output_file_path: PathBuf,
}

/// Derives the destination of an attachment stored on local disk.
///
/// `file_hash` is the upload secret of the source file; prefixing the file
/// name with it keeps equally named files apart.
#[must_use]
pub fn derive_location(
    file_name: &str,
    file_hash: &str,
    owner: &str,
    repo: &str,
    base_path: &str,
    output_root: &Path,
) -> AttachmentLocation {
    let repo_url = format!("https://github.com/{owner}/{repo}.git");
    let repo_id = repository_id(&repo_url);
    let unique_git_tag = format!("attachments-from-gitlab-{repo_id}");
    let stored_name = format!("{file_hash}-{file_name}");

    let target_path = format!(
        "{}/{repo_id}/{stored_name}",
        base_path.trim_end_matches('/')
    );
    let attachment_url =
        format!("https://github.com/{owner}/{repo}/blob/{unique_git_tag}/{target_path}?raw=true");
    let output_file_path = output_root
        .join("attachments")
        .join(format!("{repo}-{repo_id}"))
        .join(stored_name);

    AttachmentLocation {
        repo_id,
        repo_url,
        unique_git_tag,
        attachment_url,
        target_path,
        output_file_path,
    }
}

/// Derives the destination of an attachment served from object storage.
///
/// The object key is `{repo_id}/{sha256(reference)}/{file_name}`, where
/// `reference` is the upload path as it appeared in the source body.
#[must_use]
pub fn derive_object_location(
    reference: &str,
    file_name: &str,
    owner: &str,
    repo: &str,
    bucket: &str,
    region: Option<&str>,
    output_root: &Path,
) -> AttachmentLocation {
    let repo_url = format!("https://github.com/{owner}/{repo}.git");
    let repo_id = repository_id(&repo_url);
    let unique_git_tag = format!("attachments-from-gitlab-{repo_id}");

    let key = format!("{repo_id}/{}/{file_name}", content_key(reference));
    let attachment_url = match region {
        Some(region) => format!("https://s3.{region}.amazonaws.com/{bucket}/{key}"),
        None => format!("https://{bucket}.s3.amazonaws.com/{key}"),
    };
    let output_file_path = output_root.join("s3").join(bucket).join(&key);

    AttachmentLocation {
        repo_id,
        repo_url,
        unique_git_tag,
        attachment_url,
        target_path: key,
        output_file_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = ".github-migration/attachments";

    #[test]
    fn derive_location_is_deterministic() {
        let root = Path::new("out");
        let a = derive_location("log.txt", "abc", "acme", "widgets", BASE, root);
        let b = derive_location("log.txt", "abc", "acme", "widgets", BASE, root);
        assert_eq!(a, b);
    }

    #[test]
    fn different_hash_same_name_differs_only_in_path() {
        let root = Path::new("out");
        let a = derive_location("log.txt", "abc", "acme", "widgets", BASE, root);
        let b = derive_location("log.txt", "def", "acme", "widgets", BASE, root);

        assert_eq!(a.repo_id, b.repo_id);
        assert_eq!(a.unique_git_tag, b.unique_git_tag);
        assert_ne!(a.target_path, b.target_path);
        assert_ne!(a.attachment_url, b.attachment_url);
    }

    #[test]
    fn derive_location_layout() {
        let loc = derive_location(
            "log.txt",
            "abc",
            "acme",
            "widgets",
            ".github-migration/attachments/",
            Path::new("out"),
        );

        assert_eq!(loc.repo_url, "https://github.com/acme/widgets.git");
        assert_eq!(loc.repo_id.len(), 32);
        assert_eq!(
            loc.unique_git_tag,
            format!("attachments-from-gitlab-{}", loc.repo_id)
        );
        assert_eq!(
            loc.target_path,
            format!(".github-migration/attachments/{}/abc-log.txt", loc.repo_id)
        );
        assert_eq!(
            loc.attachment_url,
            format!(
                "https://github.com/acme/widgets/blob/{}/{}?raw=true",
                loc.unique_git_tag, loc.target_path
            )
        );
        assert_eq!(
            loc.output_file_path,
            Path::new("out")
                .join("attachments")
                .join(format!("widgets-{}", loc.repo_id))
                .join("abc-log.txt")
        );
    }

    #[test]
    fn object_location_urls() {
        let root = Path::new("out");
        let virtual_host = derive_object_location(
            "/uploads/abc/a.png",
            "a.png",
            "acme",
            "widgets",
            "assets",
            None,
            root,
        );
        assert!(virtual_host
            .attachment_url
            .starts_with("https://assets.s3.amazonaws.com/"));
        assert!(virtual_host.target_path.ends_with("/a.png"));
        assert!(virtual_host.target_path.starts_with(&virtual_host.repo_id));

        let path_style = derive_object_location(
            "/uploads/abc/a.png",
            "a.png",
            "acme",
            "widgets",
            "assets",
            Some("eu-west-1"),
            root,
        );
        assert_eq!(
            path_style.attachment_url,
            format!(
                "https://s3.eu-west-1.amazonaws.com/assets/{}",
                path_style.target_path
            )
        );
        assert_eq!(path_style.target_path, virtual_host.target_path);
    }
}
