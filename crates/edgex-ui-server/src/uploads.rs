//! Scratch storage for files uploaded ahead of a mutation.
//!
//! Files are named `tmp-{n}` after a counter that starts at zero on every
//! start, so uploads from a previous run can be overwritten.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

const UPLOAD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::uploads");

/// Numbered upload directory.
#[derive(Debug)]
pub struct UploadStore {
    dir: PathBuf,
    next: AtomicU64,
}

impl UploadStore {
    /// Stores uploads under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next: AtomicU64::new(0),
        }
    }

    /// Directory holding the uploads.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of upload `id`.
    #[must_use]
    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("tmp-{id}"))
    }

    /// Writes `bytes` under the next number and returns it.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    pub async fn store(&self, bytes: &[u8]) -> io::Result<u64> {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        let path = self.path_for(id);
        tokio::fs::write(&path, bytes).await?;
        debug!(target: UPLOAD_TARGET, id, path = %path.display(), size = bytes.len(), "upload stored");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[tokio::test]
    async fn numbers_uploads_from_zero() {
        let dir = TempDir::new().expect("create temp dir");
        let store = UploadStore::new(dir.path());

        assert_eq!(store.store(b"first").await.ok(), Some(0));
        assert_eq!(store.store(b"second").await.ok(), Some(1));

        let second = std::fs::read(dir.path().join("tmp-1")).expect("read upload");
        assert_eq!(second, b"second");
    }
}
