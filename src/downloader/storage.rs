// Transient storage - one scratch directory per download job
//
// A ScratchDir is removed exactly once: on `release()` or when the handle is
// dropped, whichever comes first. Removal runs on the blocking pool; when no
// runtime is around (process teardown) it runs inline. Cleanup failures are
// logged, never returned.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use super::errors::DownloadError;

const JOB_PREFIX: &str = "job-";

#[derive(Debug, Clone)]
pub struct TransientStorage {
    root: PathBuf,
}

impl TransientStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<cache dir>/video-relay/jobs`, or the system temp dir when there is no cache dir
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("video-relay").join("jobs"))
            .unwrap_or_else(|| std::env::temp_dir().join("video-relay-jobs"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh, uniquely named directory under the root
    pub async fn acquire(&self) -> Result<ScratchDir, DownloadError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let dir = tempfile::Builder::new()
            .prefix(JOB_PREFIX)
            .rand_bytes(6)
            .tempdir_in(&self.root)?;
        let path = dir.path().to_path_buf();

        debug!(job = %path.display(), "Acquired scratch directory");
        Ok(ScratchDir {
            dir: Some(dir),
            path,
        })
    }

    pub async fn release(&self, scratch: ScratchDir) {
        scratch.release().await;
    }
}

impl Default for TransientStorage {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

/// Handle to one job's scratch directory
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name, used as the job id in logs
    pub fn job_id(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Remove the directory and wait for it to be gone
    pub async fn release(mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        let path = self.path.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || remove_dir(dir, &path)).await {
            warn!(job = %self.path.display(), error = %e, "Scratch cleanup task failed");
        }
    }

    /// Start removal without waiting (drop path)
    fn cleanup(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        let path = self.path.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_dir(dir, &path));
            }
            Err(_) => remove_dir(dir, &path),
        }
    }
}

fn remove_dir(dir: TempDir, path: &Path) {
    match dir.close() {
        Ok(()) => debug!(job = %path.display(), "Released scratch directory"),
        Err(e) => warn!(job = %path.display(), error = %e, "Failed to remove scratch directory"),
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Poll until `path` is gone; drop-path removal finishes on the blocking pool.
#[cfg(test)]
pub(crate) async fn wait_for_removal(path: &Path) -> bool {
    for _ in 0..200 {
        if !path.exists() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    !path.exists()
}

/// Poll until `root` holds no job directories.
#[cfg(test)]
pub(crate) async fn wait_for_empty(root: &Path) -> bool {
    let count = || std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0);
    for _ in 0..200 {
        if count() == 0 {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    count() == 0
}
