//! Tracking of generated files for `clean`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::remove_file_if_exists;

/// Result file the TET runtime writes into the object directory.
pub const TET_RESULTS_FILE: &str = "tet_xres";

/// Ordered set of paths produced by a build.
///
/// The tracker is the only place tracked output is deleted.
#[derive(Debug, Clone, Default)]
pub struct CleanupTracker {
    paths: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl CleanupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a path. Tracking the same path again has no effect.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.seen.insert(path.clone()) {
            self.paths.push(path);
        }
    }

    /// Track every path in `paths`.
    pub fn track_all<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.track(path);
        }
    }

    /// Tracked paths in the order they were first tracked.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every tracked path that exists and empty the set.
    ///
    /// Missing files are skipped. Returns the paths actually removed. On an
    /// I/O error the paths not yet visited stay tracked.
    pub fn reset(&mut self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        let mut visited = 0;
        let mut failure = None;

        for path in &self.paths {
            match remove_file_if_exists(path) {
                Ok(true) => {
                    tracing::debug!("Removed {}", path.display());
                    removed.push(path.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
            visited += 1;
        }

        for path in self.paths.drain(..visited) {
            self.seen.remove(&path);
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_track_is_idempotent() {
        let mut tracker = CleanupTracker::new();
        tracker.track("/obj/a");
        tracker.track("/obj/b");
        tracker.track("/obj/a");

        assert_eq!(tracker.len(), 2);
        assert_eq!(
            tracker.paths(),
            &[PathBuf::from("/obj/a"), PathBuf::from("/obj/b")]
        );
    }

    #[test]
    fn test_reset_removes_tracked_and_skips_missing() {
        let tmp = TempDir::new().unwrap();
        let tracked = tmp.path().join("data.o");
        let untracked = tmp.path().join("keep.c");
        fs::write(&tracked, "x").unwrap();
        fs::write(&untracked, "y").unwrap();

        let mut tracker = CleanupTracker::new();
        tracker.track(&tracked);
        tracker.track(tmp.path().join(TET_RESULTS_FILE));

        let removed = tracker.reset().unwrap();

        assert_eq!(removed, vec![tracked.clone()]);
        assert!(!tracked.exists());
        assert!(untracked.exists());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_reset_twice() {
        let tmp = TempDir::new().unwrap();
        let mut tracker = CleanupTracker::new();
        tracker.track(tmp.path().join("never-created"));

        assert!(tracker.reset().unwrap().is_empty());
        assert!(tracker.reset().unwrap().is_empty());
    }
}
