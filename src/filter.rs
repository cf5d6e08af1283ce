/*!
 * Ignore/target filtering
 *
 * `FileFilter` composes the bundled default patterns, optional user ignore
 * patterns, an optional target allow-list and literal directory/file names
 * into one visibility decision per path.
 */

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::diagnostics::{default_diagnostics, Diagnostics};
use crate::error;
use crate::error::Result;
use crate::pattern::{parse_pattern_lines, PatternSpec};

/// Default ignore patterns shipped with the binary
pub const DEFAULT_IGNORE_PATTERNS: &str = include_str!("../assets/default.copconignore");

/// Conventional name of the user ignore file
pub const IGNORE_FILE_NAME: &str = ".copconignore";

/// Conventional name of the user target file
pub const TARGET_FILE_NAME: &str = ".copcontarget";

/// Decides whether a path is hidden from the tree and the content collection.
///
/// Paths are relative to the walk root.
pub trait PathFilter {
    /// True if the entry at `path` must be excluded
    fn should_ignore(&self, path: &Path, is_dir: bool) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&Path, bool) -> bool,
{
    fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        self(path, is_dir)
    }
}

/// Resolved filtering configuration for one run
#[derive(Clone, Debug)]
pub struct FileFilter {
    /// Bundled defaults unioned with the user's ignore patterns
    ignore_spec: PatternSpec,
    /// Allow-list; `None` admits everything
    target_spec: Option<PatternSpec>,
    /// Literal directory names to ignore
    ignore_dirs: HashSet<String>,
    /// Literal file names to ignore
    ignore_files: HashSet<String>,
    has_user_ignore: bool,
}

impl FileFilter {
    /// Build a filter from in-memory pattern sequences
    pub fn new(
        ignore_dirs: HashSet<String>,
        ignore_files: HashSet<String>,
        user_ignore_patterns: Option<Vec<String>>,
        user_target_patterns: Option<Vec<String>>,
    ) -> Result<Self> {
        Self::with_diagnostics(
            ignore_dirs,
            ignore_files,
            user_ignore_patterns,
            user_target_patterns,
            default_diagnostics(),
        )
    }

    /// Same as [`FileFilter::new`], reporting to the given sink
    pub fn with_diagnostics(
        ignore_dirs: HashSet<String>,
        ignore_files: HashSet<String>,
        user_ignore_patterns: Option<Vec<String>>,
        user_target_patterns: Option<Vec<String>>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        Self::build(
            ignore_dirs,
            ignore_files,
            user_ignore_patterns.map(|p| ("user ignore patterns".to_string(), p)),
            user_target_patterns.map(|p| ("user target patterns".to_string(), p)),
            diagnostics.as_ref(),
        )
    }

    /// Build a filter from `.copconignore` / `.copcontarget` style files.
    ///
    /// A file that is given but cannot be read is a configuration error
    /// naming that file.
    pub fn from_files(
        ignore_dirs: HashSet<String>,
        ignore_files: HashSet<String>,
        ignore_path: Option<&Path>,
        target_path: Option<&Path>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        let user_ignore = ignore_path.map(read_pattern_file).transpose()?;
        let user_target = target_path.map(read_pattern_file).transpose()?;

        Self::build(
            ignore_dirs,
            ignore_files,
            user_ignore,
            user_target,
            diagnostics.as_ref(),
        )
    }

    fn build(
        ignore_dirs: HashSet<String>,
        ignore_files: HashSet<String>,
        user_ignore: Option<(String, Vec<String>)>,
        user_target: Option<(String, Vec<String>)>,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self> {
        let defaults = PatternSpec::compile_from(
            "bundled default ignore patterns",
            parse_pattern_lines(DEFAULT_IGNORE_PATTERNS),
            diagnostics,
        )?;

        let mut ignore_spec = defaults;
        let mut has_user_ignore = false;
        if let Some((source, lines)) = user_ignore {
            let user_spec = PatternSpec::compile_from(&source, lines, diagnostics)?;
            if !user_spec.is_empty() {
                ignore_spec = ignore_spec.union(&user_spec);
                has_user_ignore = true;
            }
        }

        // A target with no usable lines restricts nothing
        let target_spec = match user_target {
            Some((source, lines)) => {
                let spec = PatternSpec::compile_from(&source, lines, diagnostics)?;
                (!spec.is_empty()).then_some(spec)
            }
            None => None,
        };

        Ok(Self {
            ignore_spec,
            target_spec,
            ignore_dirs,
            ignore_files,
            has_user_ignore,
        })
    }

    /// Whether user-supplied ignore patterns are in effect
    pub fn has_user_defined_ignore(&self) -> bool {
        self.has_user_ignore
    }

    /// Whether a target allow-list is in effect
    pub fn has_target(&self) -> bool {
        self.target_spec.is_some()
    }
}

impl PathFilter for FileFilter {
    fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        // Directories stay traversable so targeted files below them can show
        if !is_dir {
            if let Some(target) = &self.target_spec {
                if !target.matches(path, false) {
                    return true;
                }
            }
        }

        if self.ignore_spec.matches(path, is_dir) {
            return true;
        }

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };

        if is_dir {
            self.ignore_dirs.contains(name.as_ref())
        } else {
            self.ignore_files.contains(name.as_ref())
        }
    }
}

/// Read a pattern file as `(source name, pattern lines)`
fn read_pattern_file(path: &Path) -> Result<(String, Vec<String>)> {
    let text = fs::read_to_string(path).map_err(|e| {
        error!(
            Config,
            "Error reading pattern file {}: {}",
            path.display(),
            e
        )
    })?;
    Ok((path.display().to_string(), parse_pattern_lines(&text)))
}

/// Collect CLI-style name lists into a lookup set
pub fn name_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}
