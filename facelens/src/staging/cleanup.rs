use std::path::{Path, PathBuf};

use tracing::{debug, error};

/// Remove every path that currently exists.
///
/// A failure on one path never stops the others; failures are logged and
/// swallowed.
pub fn cleanup_files<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!(path = %path.display(), error = %e, "Error cleaning up file"),
        }
    }
}

/// Removes the staged files of one request when it goes out of scope.
///
/// Handlers call [`CleanupGuard::finish`] once the response is known; the
/// `Drop` impl covers early returns, panics and dropped futures. Paths are
/// drained on the first run, so cleanup happens once.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a staged path. `None` (a rejected upload) is accepted and ignored.
    pub fn track(&mut self, path: Option<PathBuf>) {
        if let Some(path) = path {
            self.paths.push(path);
        }
    }

    pub fn tracked(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn finish(mut self) {
        self.run();
    }

    fn run(&mut self) {
        let paths = std::mem::take(&mut self.paths);
        cleanup_files(&paths);
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.run();
    }
}
