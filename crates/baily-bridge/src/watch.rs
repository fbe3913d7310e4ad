//! Mount-path registration for the host runner's file watcher.
//!
//! `server_start` registers every mount directory so edits under them reach
//! the embedded server's rebuild pipeline even though reload pushes are
//! disabled for test runs.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Capability to register filesystem paths for change-watching.
pub trait WatchRegistry {
    /// Watch `path` recursively for changes.
    fn watch(&mut self, path: &Path);
}

/// `notify`-backed registry for hosts without their own watcher.
pub struct NotifyRegistry {
    watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl NotifyRegistry {
    /// Create a registry forwarding filesystem events to `handler`.
    pub fn new<F>(handler: F) -> Result<Self, notify::Error>
    where
        F: Fn(notify::Event) + Send + 'static,
    {
        let watcher = notify::recommended_watcher(move |res| match res {
            Ok(event) => handler(event),
            Err(err) => warn!("watch error: {err}"),
        })?;

        Ok(Self {
            watcher,
            roots: Vec::new(),
        })
    }

    /// Directories registered so far.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl WatchRegistry for NotifyRegistry {
    fn watch(&mut self, path: &Path) {
        match self.watcher.watch(path, RecursiveMode::Recursive) {
            Ok(()) => {
                debug!(path = %path.display(), "watching mount directory");
                self.roots.push(path.to_path_buf());
            }
            // A missing or unreadable mount dir should not take the whole
            // test run down; the server will report it when asked to build.
            Err(err) => warn!(path = %path.display(), "failed to watch: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_registry_records_roots() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = NotifyRegistry::new(|_event| {}).unwrap();

        registry.watch(dir.path());
        assert_eq!(registry.roots(), &[dir.path().to_path_buf()]);
    }

    #[test]
    fn test_notify_registry_skips_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let mut registry = NotifyRegistry::new(|_event| {}).unwrap();

        registry.watch(&missing);
        assert!(registry.roots().is_empty());
    }
}
