//! Small filesystem helpers shared by the pipeline and the dashboard.
//!
//! Both services create their data and model directories on startup so a
//! fresh checkout works without any manual setup.

use std::fs;
use std::path::Path;

use log::{error, info};

/// Create `path` and any missing parents, logging when something was
/// actually created. Errors propagate to the caller.
pub fn create_dir_all(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Best-effort variant of [`create_dir_all`] for callers that only want to
/// warn and carry on. Returns whether the directory exists afterwards.
pub fn ensure_dir_exists(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if path.is_dir() {
        return true;
    }
    match fs::create_dir_all(path) {
        Ok(()) => {
            info!("Created directory: {}", path.display());
            true
        }
        Err(e) => {
            error!("Failed to create directory {}: {}", path.display(), e);
            false
        }
    }
}

pub fn path_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}
