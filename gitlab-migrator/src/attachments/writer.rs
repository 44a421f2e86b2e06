//! Background writes of attachment streams.
//!
//! Writes are spawned onto a [`TaskTracker`] so that the caller only waits
//! for the write to be scheduled. [`AttachmentWriter::drain`] joins them at
//! the end of a run, bounded by a timeout.

use super::AttachmentError;
use crate::platform::ByteStream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

/// Number of attachment files currently open for writing.
///
/// Only a [`HandleGuard`] decrements the count, and only once, so the value
/// never goes below zero.
#[derive(Debug, Clone, Default)]
pub struct OpenHandleCounter {
    open: Arc<AtomicUsize>,
}

impl OpenHandleCounter {
    /// Current number of open handles.
    #[must_use]
    pub fn get(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Records an opened handle until the returned guard is dropped.
    #[must_use]
    pub fn open(&self) -> HandleGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        HandleGuard {
            open: Arc::clone(&self.open),
        }
    }
}

/// Keeps one handle counted as open.
#[derive(Debug)]
pub struct HandleGuard {
    open: Arc<AtomicUsize>,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawns and tracks attachment writes.
#[derive(Debug, Clone, Default)]
pub struct AttachmentWriter {
    tracker: TaskTracker,
    handles: OpenHandleCounter,
}

impl AttachmentWriter {
    /// Creates a writer with no writes in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts writing `stream` to `path` in the background.
    ///
    /// Failures are logged and never reach the caller.
    pub fn persist(&self, path: PathBuf, stream: ByteStream) {
        let handles = self.handles.clone();
        self.tracker.spawn(async move {
            match write_stream(&path, stream, &handles).await {
                Ok(bytes) => debug!(path = %path.display(), bytes, "Attachment written"),
                Err(e) => error!(path = %path.display(), error = %e, "Attachment write failed"),
            }
        });
    }

    /// Open handle counter shared with the spawned writes.
    #[must_use]
    pub fn handles(&self) -> &OpenHandleCounter {
        &self.handles
    }

    /// Number of writes that have not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for all spawned writes, giving up after `timeout`.
    ///
    /// Returns `true` when everything finished in time. No further writes
    /// should be started afterwards.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        if tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
        {
            return true;
        }

        warn!(
            pending = self.tracker.len(),
            open_handles = self.handles.get(),
            timeout_secs = timeout.as_secs(),
            "Timed out waiting for attachment writes, continuing"
        );
        false
    }
}

/// Writes the whole stream to `path`, returning the number of bytes written.
async fn write_stream(
    path: &Path,
    stream: ByteStream,
    handles: &OpenHandleCounter,
) -> Result<u64, AttachmentError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| AttachmentError::CreateDirError {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let file = File::create(path)
        .await
        .map_err(|source| AttachmentError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    let guard = handles.open();
    // The file is closed inside `pipe`, before the guard is released.
    let result = pipe(file, stream, path).await;
    drop(guard);
    result
}

async fn pipe(mut file: File, mut stream: ByteStream, path: &Path) -> Result<u64, AttachmentError> {
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| AttachmentError::StreamError {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|source| AttachmentError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|source| AttachmentError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(written)
}
