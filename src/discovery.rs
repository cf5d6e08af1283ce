/*!
 * Upward discovery of configuration files
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::{Diagnostics, ScanEvent};
use crate::filter::{IGNORE_FILE_NAME, TARGET_FILE_NAME};

/// Walk from `start` up to the filesystem root looking for `file_name`.
///
/// The closest match wins. Candidates that cannot be inspected (permission
/// errors and the like) count as absent.
pub fn find_upward(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = absolute(start);

    loop {
        let candidate = current.join(file_name);
        if is_regular_file(&candidate) {
            return Some(candidate);
        }

        let parent = match current.parent() {
            Some(parent) if parent != current.as_path() => parent.to_path_buf(),
            _ => return None,
        };
        current = parent;
    }
}

/// Find the nearest `.copconignore` at or above `start`
pub fn discover_ignore_file(start: &Path, diagnostics: &dyn Diagnostics) -> Option<PathBuf> {
    discover(start, IGNORE_FILE_NAME, diagnostics)
}

/// Find the nearest `.copcontarget` at or above `start`
pub fn discover_target_file(start: &Path, diagnostics: &dyn Diagnostics) -> Option<PathBuf> {
    discover(start, TARGET_FILE_NAME, diagnostics)
}

fn discover(start: &Path, file_name: &str, diagnostics: &dyn Diagnostics) -> Option<PathBuf> {
    let found = find_upward(start, file_name)?;
    diagnostics.record(&ScanEvent::ConfigDiscovered {
        path: found.clone(),
    });
    Some(found)
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Resolve symlinks where possible, otherwise anchor at the current directory
fn absolute(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const MARKER: &str = ".copcon-discovery-test-marker";

    #[test]
    fn test_finds_marker_in_ancestor() {
        let root = tempdir().unwrap();
        let a = root.path().join("A");
        let c = a.join("B").join("C");
        fs::create_dir_all(&c).unwrap();
        fs::write(a.join(MARKER), "x").unwrap();

        let found = find_upward(&c, MARKER).unwrap();
        assert_eq!(found, fs::canonicalize(a.join(MARKER)).unwrap());
    }

    #[test]
    fn test_nearest_marker_wins() {
        let root = tempdir().unwrap();
        let a = root.path().join("A");
        let b = a.join("B");
        let c = b.join("C");
        fs::create_dir_all(&c).unwrap();
        fs::write(a.join(MARKER), "far").unwrap();
        fs::write(b.join(MARKER), "near").unwrap();

        let found = find_upward(&c, MARKER).unwrap();
        assert_eq!(found, fs::canonicalize(b.join(MARKER)).unwrap());
    }

    #[test]
    fn test_marker_in_start_directory() {
        let root = tempdir().unwrap();
        fs::write(root.path().join(MARKER), "here").unwrap();
        let found = find_upward(root.path(), MARKER).unwrap();
        assert_eq!(fs::read_to_string(found).unwrap(), "here");
    }

    #[test]
    fn test_directory_with_marker_name_is_skipped() {
        let root = tempdir().unwrap();
        let a = root.path().join("A");
        let b = a.join("B");
        fs::create_dir_all(b.join(MARKER)).unwrap();
        fs::write(a.join(MARKER), "file").unwrap();

        let found = find_upward(&b, MARKER).unwrap();
        assert_eq!(found, fs::canonicalize(a.join(MARKER)).unwrap());
    }

    #[test]
    fn test_missing_marker_returns_none() {
        let root = tempdir().unwrap();
        assert!(find_upward(root.path(), ".copcon-marker-that-does-not-exist").is_none());
    }

    #[test]
    fn test_discovery_is_reported() {
        let root = tempdir().unwrap();
        fs::write(root.path().join(IGNORE_FILE_NAME), "*.md\n").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |event: &ScanEvent| seen.lock().unwrap().push(event.clone())
        };

        let found = discover_ignore_file(root.path(), &sink);
        assert!(found.is_some());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
