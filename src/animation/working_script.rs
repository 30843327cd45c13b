use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// Resolved scene script written for a single render.
///
/// The file is removed when the value is dropped; a file that is already
/// gone is not an error.
#[derive(Debug)]
pub struct WorkingScript {
    path: PathBuf,
}

impl WorkingScript {
    /// Write `contents` to `path`, replacing whatever was there
    pub async fn create<P: Into<PathBuf>>(path: P, contents: &str) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        debug!("Wrote working script {} ({} bytes)", path.display(), contents.len());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now rather than at end of scope
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for WorkingScript {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed working script {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove working script {}: {}", self.path.display(), e),
        }
    }
}
