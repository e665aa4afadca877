use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use fs2::FileExt;
use log::debug;

///////////////////////////////
/// Advisory exclusive lock guarding one build tree against concurrent
/// invocations. The lock file is created on first use and stays behind on
/// release; only the OS-level lock matters, never the file's existence.
/// Dropping the guard releases the lock, as does the OS if the holder dies
pub struct BuildLock {
    file: File,
    path: PathBuf,
}

impl BuildLock {
    /// Block until the exclusive lock on this path is ours. No timeout:
    /// a second invocation waits for however long the first one builds
    pub fn acquire(path: &Path) -> Result<BuildLock> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;
        debug!("Waiting for lock {}", path.display());
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", path.display()))?;
        debug!("Acquired lock {}", path.display());
        Ok(BuildLock {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!("Released lock {}", self.path.display());
    }
}
