use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::LipsyncResult;

/// A job's scratch directory, removed with everything in it on drop.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    keep: bool,
}

impl WorkDir {
    pub fn create(path: PathBuf) -> LipsyncResult<Self> {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create work directory '{}'", path.display()))?;
        Ok(Self { path, keep: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the directory on disk when dropped.
    pub fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "failed to remove work directory");
        }
    }
}
