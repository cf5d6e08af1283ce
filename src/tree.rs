/*!
 * Directory tree rendering
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use crate::diagnostics::{default_diagnostics, Diagnostics, ScanEvent};
use crate::filter::PathFilter;

/// Marker appended to ignored directories, which are shown but not entered
pub const HIDDEN_CONTENTS_MARKER: &str = "(contents not displayed)";

/// Rendered tree with the number of directories and files it shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTree {
    /// ASCII tree, one entry per line, without the root name
    pub rendered: String,
    /// Directories shown, counting the root
    pub directory_count: usize,
    /// Files shown
    pub file_count: usize,
}

/// Renders an ASCII tree of a directory, consulting a filter for each entry
pub struct TreeRenderer<'a> {
    /// Directory the walk starts from
    root: PathBuf,
    /// Deepest level to descend into; `None` is unlimited
    max_depth: Option<usize>,
    filter: &'a dyn PathFilter,
    diagnostics: Arc<dyn Diagnostics>,
    directory_count: usize,
    file_count: usize,
}

impl<'a> TreeRenderer<'a> {
    /// Create a renderer for `root`
    pub fn new(root: impl Into<PathBuf>, max_depth: Option<usize>, filter: &'a dyn PathFilter) -> Self {
        Self {
            root: root.into(),
            max_depth,
            filter,
            diagnostics: default_diagnostics(),
            directory_count: 0,
            file_count: 0,
        }
    }

    /// Report unreadable directories to `diagnostics`
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Walk the tree and render it
    pub fn render(mut self) -> DirectoryTree {
        self.directory_count = 1;
        self.file_count = 0;

        let root = self.root.clone();
        let mut lines = Vec::new();
        self.render_directory(&root, 0, "", &mut lines);

        DirectoryTree {
            rendered: lines.join("\n"),
            directory_count: self.directory_count,
            file_count: self.file_count,
        }
    }

    fn render_directory(&mut self, dir: &Path, depth: usize, prefix: &str, lines: &mut Vec<String>) {
        if let Some(max) = self.max_depth {
            if depth > max {
                return;
            }
        }

        let (mut entries, failed) = match list_children(dir) {
            Ok(listing) => listing,
            Err(e) => {
                self.record_unreadable(dir, &e);
                lines.push(format!("{}Error accessing {}: {}", prefix, dir.display(), e));
                return;
            }
        };

        entries.sort_by_key(|e| {
            (
                !is_directory(e),
                e.file_name().to_string_lossy().to_lowercase(),
            )
        });

        // Ignored directories stay visible with a marker; ignored files vanish
        let visible: Vec<(DirEntry, bool)> = entries
            .into_iter()
            .filter_map(|entry| {
                let is_dir = is_directory(&entry);
                let ignored = self.filter.should_ignore(self.relative(entry.path()), is_dir);
                match (ignored, is_dir) {
                    (false, _) => Some((entry, false)),
                    (true, true) => Some((entry, true)),
                    (true, false) => None,
                }
            })
            .collect();

        let count = visible.len();
        for (i, (entry, contents_hidden)) in visible.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            let name = entry.file_name().to_string_lossy();

            if contents_hidden {
                lines.push(format!("{}{}{} {}", prefix, connector, name, HIDDEN_CONTENTS_MARKER));
                continue;
            }

            lines.push(format!("{}{}{}", prefix, connector, name));

            if !is_directory(&entry) {
                self.file_count += 1;
                continue;
            }

            self.directory_count += 1;
            // Linked directories are listed but never entered
            if entry.path_is_symlink() {
                continue;
            }
            let extension = if is_last { "    " } else { "│   " };
            let child_prefix = format!("{}{}", prefix, extension);
            self.render_directory(entry.path(), depth + 1, &child_prefix, lines);
        }

        // Children that could not be inspected are reported after the rest
        for e in failed {
            let path = e.path().unwrap_or(dir).to_path_buf();
            self.record_unreadable(&path, &e);
            lines.push(format!("{}Error accessing {}: {}", prefix, path.display(), e));
        }
    }

    fn record_unreadable(&self, path: &Path, e: &walkdir::Error) {
        self.diagnostics.record(&ScanEvent::DirectoryUnreadable {
            path: path.to_path_buf(),
            error: e.to_string(),
        });
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// True for directories and for symlinks pointing at one
fn is_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

/// Immediate children of `dir` plus the children that failed to list.
///
/// Fails as a whole only when `dir` itself cannot be read.
fn list_children(dir: &Path) -> Result<(Vec<DirEntry>, Vec<walkdir::Error>), walkdir::Error> {
    let (entries, failed) = split_listing(WalkDir::new(dir).min_depth(1).max_depth(1));

    let mut child_failures = Vec::new();
    for e in failed {
        if e.depth() == 0 {
            return Err(e);
        }
        child_failures.push(e);
    }
    Ok((entries, child_failures))
}

/// Separate readable entries from failures, keeping both in listing order
fn split_listing<T, E>(results: impl IntoIterator<Item = Result<T, E>>) -> (Vec<T>, Vec<E>) {
    let mut entries = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => failures.push(e),
        }
    }
    (entries, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn show_everything(_: &Path, _: bool) -> bool {
        false
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("dir1")).unwrap();
        fs::create_dir(dir.path().join("dir2")).unwrap();
        fs::write(dir.path().join("dir1").join("file1.py"), "").unwrap();
        fs::write(dir.path().join("dir2").join("file2.py"), "").unwrap();
        fs::write(dir.path().join("file3.py"), "").unwrap();
        dir
    }

    #[test]
    fn test_counts_root_directories_and_files() {
        let dir = sample_tree();
        let filter = show_everything;
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();

        assert_eq!(tree.directory_count, 3);
        assert_eq!(tree.file_count, 3);
    }

    #[test]
    fn test_rendered_layout() {
        let dir = sample_tree();
        let filter = show_everything;
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();

        let expected = [
            "├── dir1",
            "│   └── file1.py",
            "├── dir2",
            "│   └── file2.py",
            "└── file3.py",
        ]
        .join("\n");
        assert_eq!(tree.rendered, expected);
    }

    #[test]
    fn test_directories_first_then_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("A.txt"), "").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("Alpha")).unwrap();

        let filter = show_everything;
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();
        let names: Vec<&str> = tree
            .rendered
            .lines()
            .filter_map(|l| l.split("── ").nth(1))
            .collect();
        assert_eq!(names, vec!["Alpha", "zeta", "A.txt", "b.txt"]);
    }

    #[test]
    fn test_depth_limit_stops_descent() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        fs::write(dir.path().join("a").join("b").join("deep.txt"), "").unwrap();
        fs::write(dir.path().join("a").join("shallow.txt"), "").unwrap();

        let filter = show_everything;
        let tree = TreeRenderer::new(dir.path(), Some(0), &filter).render();
        assert_eq!(tree.rendered, "└── a");
        assert_eq!(tree.directory_count, 2);
        assert_eq!(tree.file_count, 0);

        let tree = TreeRenderer::new(dir.path(), Some(1), &filter).render();
        assert!(tree.rendered.contains("shallow.txt"));
        assert!(!tree.rendered.contains("deep.txt"));
    }

    #[test]
    fn test_ignored_directory_shows_marker_and_is_not_entered() {
        let dir = sample_tree();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules").join("lib.js"), "").unwrap();

        let filter = |path: &Path, is_dir: bool| {
            (is_dir && path == Path::new("node_modules")) || path.ends_with("file3.py")
        };
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();

        assert!(tree
            .rendered
            .contains("└── node_modules (contents not displayed)"));
        assert!(!tree.rendered.contains("lib.js"));
        assert!(!tree.rendered.contains("file3.py"));
        assert_eq!(tree.directory_count, 3);
        assert_eq!(tree.file_count, 2);
    }

    #[test]
    fn test_filter_sees_paths_relative_to_root() {
        let dir = sample_tree();
        let filter = |path: &Path, _: bool| path == Path::new("dir1/file1.py");
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();

        assert!(!tree.rendered.contains("file1.py"));
        assert!(tree.rendered.contains("file2.py"));
    }

    #[test]
    fn test_missing_root_renders_error_line() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let filter = show_everything;
        let tree = TreeRenderer::new(&missing, None, &filter).render();

        assert!(tree.rendered.starts_with("Error accessing"));
        assert_eq!(tree.directory_count, 1);
        assert_eq!(tree.file_count, 0);
    }

    #[test]
    fn test_split_listing_keeps_good_entries() {
        let results: Vec<Result<&str, &str>> = vec![Ok("a"), Err("bad"), Ok("b")];
        let (entries, failures) = split_listing(results);
        assert_eq!(entries, vec!["a", "b"]);
        assert_eq!(failures, vec!["bad"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_a_directory_that_is_not_entered() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real").join("f.txt"), "").unwrap();
        symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let filter = show_everything;
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();
        assert_eq!(tree.rendered, "├── link\n└── real\n    └── f.txt");
        assert_eq!(tree.directory_count, 3);
        assert_eq!(tree.file_count, 1);

        // Directory-only rules and names apply to the link as well
        let filter = |path: &Path, is_dir: bool| is_dir && path == Path::new("link");
        let tree = TreeRenderer::new(dir.path(), None, &filter).render();
        assert!(tree.rendered.contains("link (contents not displayed)"));
        assert_eq!(tree.file_count, 1);
    }
}
