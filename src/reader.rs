/*!
 * File content collection
 */

use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use crate::diagnostics::{default_diagnostics, Diagnostics, ScanEvent};
use crate::error::{CopconError, FileReadFailure, ReadFailures, Result};
use crate::filter::PathFilter;

/// Number of leading bytes inspected for NUL when detecting binary files
pub const BINARY_SAMPLE_SIZE: usize = 1024;

/// File contents keyed by path relative to the collection root, in walk order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentMap {
    entries: Vec<(String, String)>,
    total_chars: usize,
}

impl ContentMap {
    /// Append a file's content
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let content = content.into();
        self.total_chars += content.chars().count();
        self.entries.push((path.into(), content));
    }

    /// Content stored for `path`
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_str())
    }

    /// Iterate over `(path, content)` pairs in walk order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Paths in walk order
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Characters across every stored content
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }
}

/// Reads every visible file below a base directory
pub struct ContentReader<'a> {
    base: PathBuf,
    filter: &'a dyn PathFilter,
    /// Skip paths with a component starting with `.`
    exclude_hidden: bool,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<'a> ContentReader<'a> {
    /// Create a reader rooted at `base`
    pub fn new(base: impl Into<PathBuf>, filter: &'a dyn PathFilter, exclude_hidden: bool) -> Self {
        Self {
            base: base.into(),
            filter,
            exclude_hidden,
            diagnostics: default_diagnostics(),
        }
    }

    /// Report unreadable files to `diagnostics`
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Read every file that is neither hidden (when excluded) nor filtered.
    ///
    /// A file that cannot be read does not stop the walk. When any read
    /// fails, the error lists every failure and carries the contents that
    /// were read.
    pub fn read_all(&self) -> Result<ContentMap> {
        let mut contents = ContentMap::default();
        let mut failures = Vec::new();

        let walker = WalkDir::new(&self.base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.prune(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| self.relative(p).to_path_buf())
                        .unwrap_or_default();
                    self.record_failure(&mut failures, path, io::Error::from(e));
                    continue;
                }
            };

            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }

            let relative = self.relative(entry.path());
            if self.exclude_hidden && is_hidden(relative) {
                continue;
            }
            if self.filter.should_ignore(relative, false) {
                continue;
            }

            match read_file(entry.path()) {
                Ok(content) => contents.insert(relative.to_string_lossy(), content),
                Err(e) => self.record_failure(&mut failures, relative.to_path_buf(), e),
            }
        }

        if failures.is_empty() {
            Ok(contents)
        } else {
            Err(CopconError::Read(ReadFailures {
                failures,
                partial: contents,
            }))
        }
    }

    /// Directories below the root that the walk should not enter
    fn prune(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let relative = self.relative(entry.path());
        (self.exclude_hidden && is_hidden(relative)) || self.filter.should_ignore(relative, true)
    }

    fn record_failure(&self, failures: &mut Vec<FileReadFailure>, path: PathBuf, source: io::Error) {
        self.diagnostics.record(&ScanEvent::FileUnreadable {
            path: path.clone(),
            error: source.to_string(),
        });
        failures.push(FileReadFailure { path, source });
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.base).unwrap_or(path)
    }
}

/// True if any component of `path` starts with a dot
pub fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Read a file as lossy UTF-8, or describe it if it looks binary
fn read_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;

    let mut bytes = Vec::with_capacity(BINARY_SAMPLE_SIZE);
    (&mut file)
        .take(BINARY_SAMPLE_SIZE as u64)
        .read_to_end(&mut bytes)?;

    if bytes.contains(&0) {
        let size = file.metadata()?.len();
        return Ok(format!("[Binary file] Size: {} bytes", size));
    }

    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
