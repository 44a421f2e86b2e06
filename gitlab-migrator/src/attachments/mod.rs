//! Rehoming of GitLab uploads referenced from markdown bodies.
//!
//! An [`AttachmentStore`] is created for each project, rewrites every body
//! that is about to be migrated, and is flushed and drained at the end:
//!
//! 1. Upload references are found in the body.
//! 2. Each upload is downloaded from the source platform as a stream.
//! 3. The stream is written to a deterministic location in the background.
//! 4. The reference is replaced with the attachment's public URL and the
//!    attachment is registered in the manifest.

mod error;
mod location;
mod manifest;
mod reference;
mod writer;

pub use error::AttachmentError;
pub use location::{derive_location, derive_object_location, AttachmentLocation, StorageBackend};
pub use manifest::{Attachment, AttachmentManifest, RepositoryAttachmentGroup};
pub use reference::{find_upload_references, ApiPath, UploadReference};
pub use writer::{AttachmentWriter, HandleGuard, OpenHandleCounter};

use crate::platform::{ByteStream, SourcePlatform};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default directory inside the target repository for attachments.
pub const DEFAULT_TARGET_BASE_PATH: &str = ".github-migration/attachments";

/// Layout settings for an [`AttachmentStore`].
#[derive(Debug, Clone)]
pub struct AttachmentStoreConfig {
    /// Target repository owner.
    pub owner: String,

    /// Target repository name.
    pub repo: String,

    /// Source project used for upload paths that carry no project.
    pub default_project: String,

    /// Directory inside the target repository attachments are published to.
    pub target_base_path: String,

    /// Local directory the bytes are written below.
    pub output_root: PathBuf,

    /// Where the attachments are served from.
    pub backend: StorageBackend,
}

/// Rewrites upload references and keeps track of the rehomed files.
#[derive(Debug)]
pub struct AttachmentStore {
    config: AttachmentStoreConfig,
    manifest: AttachmentManifest,
    writer: AttachmentWriter,
}

impl AttachmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: AttachmentStoreConfig) -> Self {
        Self {
            config,
            manifest: AttachmentManifest::default(),
            writer: AttachmentWriter::new(),
        }
    }

    /// Derives where the upload at `path` goes.
    #[must_use]
    pub fn locate(&self, path: &str, upload: &ApiPath) -> AttachmentLocation {
        let config = &self.config;
        match &config.backend {
            StorageBackend::LocalDisk => derive_location(
                &upload.file_name,
                &upload.secret,
                &config.owner,
                &config.repo,
                &config.target_base_path,
                &config.output_root,
            ),
            StorageBackend::ObjectStorage { bucket, region } => derive_object_location(
                path,
                &upload.file_name,
                &config.owner,
                &config.repo,
                bucket,
                region.as_deref(),
                &config.output_root,
            ),
        }
    }

    /// Rewrites every upload reference in `body` to its rehomed URL.
    ///
    /// References that cannot be parsed or downloaded are left unchanged.
    pub async fn rewrite_body<S>(&mut self, body: &str, source: &S) -> String
    where
        S: SourcePlatform + ?Sized,
    {
        let references = find_upload_references(body);
        if references.is_empty() {
            return body.to_string();
        }

        let mut rewritten = String::with_capacity(body.len());
        let mut cursor = 0;
        for reference in &references {
            rewritten.push_str(&body[cursor..reference.span.start]);
            match self.rehome(reference, source).await {
                Some(url) => rewritten.push_str(&reference.render(&url)),
                None => rewritten.push_str(&body[reference.span.clone()]),
            }
            cursor = reference.span.end;
        }
        rewritten.push_str(&body[cursor..]);
        rewritten
    }

    async fn rehome<S>(&mut self, reference: &UploadReference<'_>, source: &S) -> Option<String>
    where
        S: SourcePlatform + ?Sized,
    {
        let Some(upload) = ApiPath::parse(reference.path, &self.config.default_project) else {
            warn!(
                path = reference.path,
                "Upload reference without secret or file name, leaving it unchanged"
            );
            return None;
        };

        let location = self.locate(reference.path, &upload);
        if self.manifest.contains(&location.repo_id, &location.target_path) {
            debug!(path = reference.path, "Attachment already rehomed");
            return Some(location.attachment_url);
        }

        let Some(stream) = source.fetch_attachment(&upload.relative_url()).await else {
            warn!(
                path = reference.path,
                "Could not download attachment, leaving reference unchanged"
            );
            return None;
        };

        self.persist(location.output_file_path.clone(), stream);
        self.register(
            &location.repo_id,
            &location.repo_url,
            &location.unique_git_tag,
            Attachment {
                attachment_url: location.attachment_url.clone(),
                target_path: location.target_path,
                file_path: Some(location.output_file_path),
            },
        );

        info!(
            path = reference.path,
            url = %location.attachment_url,
            "Rehomed attachment"
        );
        Some(location.attachment_url)
    }

    /// Writes `stream` to `path` in the background.
    pub fn persist(&self, path: PathBuf, stream: ByteStream) {
        self.writer.persist(path, stream);
    }

    /// Adds an attachment to the group of `repo_id`.
    pub fn register(
        &mut self,
        repo_id: &str,
        repo_url: &str,
        unique_git_tag: &str,
        attachment: Attachment,
    ) {
        self.manifest
            .register(repo_id, repo_url, unique_git_tag, attachment);
    }

    /// Attachments registered so far.
    #[must_use]
    pub fn manifest(&self) -> &AttachmentManifest {
        &self.manifest
    }

    /// Merges the registered attachments into the manifest at `path`.
    ///
    /// Groups written by earlier projects of the same run are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing manifest cannot be read or the merged
    /// one cannot be written.
    pub async fn flush(&self, path: &Path) -> Result<(), AttachmentError> {
        let mut merged = AttachmentManifest::load(path).await?;
        merged.merge(&self.manifest);
        merged.write(path).await?;
        info!(
            path = %path.display(),
            attachments = self.manifest.attachment_count(),
            total = merged.attachment_count(),
            "Wrote attachment manifest"
        );
        Ok(())
    }

    /// Waits for outstanding writes, giving up after `timeout`.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.writer.drain(timeout).await
    }

    /// Number of attachment files currently open for writing.
    #[must_use]
    pub fn open_handle_count(&self) -> usize {
        self.writer.handles().get()
    }
}

/// Removes a manifest left over from a previous run.
///
/// # Errors
///
/// Returns [`AttachmentError::RemoveError`] if the file exists but cannot be
/// removed.
pub async fn remove_stale_manifest(path: &Path) -> Result<bool, AttachmentError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Removed attachment manifest of previous run");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(AttachmentError::RemoveError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemorySource;
    use tempfile::TempDir;

    fn store(root: &Path, backend: StorageBackend) -> AttachmentStore {
        AttachmentStore::new(AttachmentStoreConfig {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            default_project: "42".to_string(),
            target_base_path: DEFAULT_TARGET_BASE_PATH.to_string(),
            output_root: root.to_path_buf(),
            backend,
        })
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::default();
        source
            .attachments
            .insert("42/uploads/abc/shot.png".to_string(), b"png-bytes".to_vec());
        source
    }

    #[tokio::test]
    async fn rewrites_reference_and_persists_bytes() {
        let dir = TempDir::new().unwrap();
        let mut store = store(dir.path(), StorageBackend::LocalDisk);

        let body = "Before ![shot](/uploads/abc/shot.png) after";
        let rewritten = store.rewrite_body(body, &source()).await;

        let expected = derive_location(
            "shot.png",
            "abc",
            "acme",
            "widgets",
            DEFAULT_TARGET_BASE_PATH,
            dir.path(),
        );
        assert_eq!(
            rewritten,
            format!("Before ![shot]({}) after", expected.attachment_url)
        );

        assert!(store.drain(Duration::from_secs(5)).await);
        assert_eq!(store.open_handle_count(), 0);
        assert_eq!(
            std::fs::read(&expected.output_file_path).unwrap(),
            b"png-bytes"
        );

        let group = store.manifest().group(&expected.repo_id).unwrap();
        assert_eq!(group.unique_git_tag, expected.unique_git_tag);
        assert_eq!(group.attachments.len(), 1);
        assert_eq!(group.attachments[0].target_path, expected.target_path);
    }

    #[tokio::test]
    async fn failed_download_leaves_reference_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = store(dir.path(), StorageBackend::LocalDisk);

        let body = "[log](/uploads/missing/log.txt) and [bad](/uploads/nosecret)";
        let rewritten = store.rewrite_body(body, &source()).await;

        assert_eq!(rewritten, body);
        assert!(store.manifest().is_empty());
    }

    #[tokio::test]
    async fn repeated_reference_is_registered_once() {
        let dir = TempDir::new().unwrap();
        let mut store = store(dir.path(), StorageBackend::LocalDisk);

        let body = "[a](/uploads/abc/shot.png) [b](/uploads/abc/shot.png)";
        let rewritten = store.rewrite_body(body, &source()).await;

        assert!(!rewritten.contains("/uploads/abc"));
        assert_eq!(store.manifest().attachment_count(), 1);
        assert!(store.drain(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn object_storage_backend_uses_bucket_urls() {
        let dir = TempDir::new().unwrap();
        let mut store = store(
            dir.path(),
            StorageBackend::ObjectStorage {
                bucket: "assets".to_string(),
                region: None,
            },
        );

        let rewritten = store
            .rewrite_body("![shot](/uploads/abc/shot.png)", &source())
            .await;

        assert!(rewritten.starts_with("![shot](https://assets.s3.amazonaws.com/"));
        assert!(store.drain(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn body_without_references_passes_through() {
        let dir = TempDir::new().unwrap();
        let mut store = store(dir.path(), StorageBackend::LocalDisk);

        let body = "Nothing to see [here](https://example.com)";
        assert_eq!(store.rewrite_body(body, &source()).await, body);
    }

    #[tokio::test]
    async fn flush_keeps_groups_of_other_repositories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let mut widgets = store(dir.path(), StorageBackend::LocalDisk);
        widgets
            .rewrite_body("[a](/uploads/abc/shot.png)", &source())
            .await;
        widgets.flush(&path).await.unwrap();

        let mut gadgets = AttachmentStore::new(AttachmentStoreConfig {
            repo: "gadgets".to_string(),
            ..widgets.config.clone()
        });
        gadgets
            .rewrite_body("[a](/uploads/abc/shot.png)", &source())
            .await;
        gadgets.flush(&path).await.unwrap();

        let parsed = AttachmentManifest::load(&path).await.unwrap();
        assert_eq!(parsed.attachment_count(), 2);
        let widgets_id = crate::hashing::repository_id("https://github.com/acme/widgets");
        let gadgets_id = crate::hashing::repository_id("https://github.com/acme/gadgets");
        assert!(parsed.group(&widgets_id).is_some());
        assert!(parsed.group(&gadgets_id).is_some());

        assert!(widgets.drain(Duration::from_secs(5)).await);
        assert!(gadgets.drain(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn flush_writes_manifest_and_stale_one_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        let mut store = store(dir.path(), StorageBackend::LocalDisk);
        store
            .rewrite_body("[a](/uploads/abc/shot.png)", &source())
            .await;

        store.flush(&path).await.unwrap();
        let parsed: AttachmentManifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(&parsed, store.manifest());

        assert!(remove_stale_manifest(&path).await.unwrap());
        assert!(!remove_stale_manifest(&path).await.unwrap());
        assert!(store.drain(Duration::from_secs(5)).await);
    }
}
