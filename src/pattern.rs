/*!
 * Gitignore-style pattern sets
 *
 * A `PatternSpec` is an immutable, compiled set of gitignore patterns that
 * answers whether a path relative to the walk root is matched. Specs built
 * from different sources are combined with `union`, which matches whatever
 * any constituent matches.
 */

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::bail;
use crate::diagnostics::{default_diagnostics, Diagnostics, ScanEvent};
use crate::error::Result;

/// Compiled set of gitignore-style patterns
#[derive(Clone, Debug, Default)]
pub struct PatternSpec {
    sets: Vec<Arc<Gitignore>>,
}

impl PatternSpec {
    /// A spec that matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile pattern lines that came from an unnamed source
    pub fn compile<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::compile_from("<patterns>", lines, default_diagnostics().as_ref())
    }

    /// Compile pattern lines, naming `source` in diagnostics and errors.
    ///
    /// A line the glob parser rejects is retried with every glob
    /// metacharacter escaped, so it matches its own text literally. Only a
    /// failure to build the final matcher is reported as an error.
    pub fn compile_from<I, S>(source: &str, lines: I, diagnostics: &dyn Diagnostics) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(".");

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if has_dangling_escape(line) || builder.add_line(None, line).is_err() {
                diagnostics.record(&ScanEvent::PatternDegraded {
                    source: source.to_string(),
                    line: line.to_string(),
                });
                if let Err(e) = builder.add_line(None, &escape_literal(line)) {
                    diagnostics.record(&ScanEvent::PatternRejected {
                        source: source.to_string(),
                        line: line.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let gitignore = match builder.build() {
            Ok(gitignore) => gitignore,
            Err(e) => bail!(Config, "Failed to compile patterns from {}: {}", source, e),
        };

        diagnostics.record(&ScanEvent::PatternsLoaded {
            source: source.to_string(),
            patterns: gitignore.num_ignores() as usize,
        });

        if gitignore.is_empty() {
            return Ok(Self::empty());
        }

        Ok(Self {
            sets: vec![Arc::new(gitignore)],
        })
    }

    /// Check whether `path` (relative to the walk root) is matched.
    ///
    /// Separators are normalized to `/`. A path also matches when one of its
    /// parent directories matches, so `build/` covers `build/out/main.o`.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        if self.sets.is_empty() {
            return false;
        }

        let normalized = normalize(path);
        if normalized.as_os_str().is_empty() {
            return false;
        }

        self.sets.iter().any(|set| {
            set.matched_path_or_any_parents(&normalized, is_dir)
                .is_ignore()
        })
    }

    /// Combine two specs into one matching anything either matches
    pub fn union(&self, other: &PatternSpec) -> PatternSpec {
        let mut sets = self.sets.clone();
        sets.extend(other.sets.iter().cloned());
        PatternSpec { sets }
    }

    /// True if there are no patterns, so nothing matches
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of compiled ignore patterns across all constituents
    pub fn len(&self) -> usize {
        self.sets.iter().map(|s| s.num_ignores() as usize).sum()
    }
}

/// Split pattern file text into pattern lines, dropping blanks and comments
pub fn parse_pattern_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Rebuild `path` from its normal components using `/` separators
fn normalize(path: &Path) -> PathBuf {
    let unified = path.to_string_lossy().replace('\\', "/");
    Path::new(&unified)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// True if the line ends in an unpaired backslash, which escapes nothing
fn has_dangling_escape(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Escape glob metacharacters so a line matches its own text.
///
/// Backslashes become `/` the same way `normalize` treats them in paths, and
/// a trailing separator is dropped since normalized paths never end in one.
fn escape_literal(line: &str) -> String {
    let unified = line.replace('\\', "/");
    let unified = unified.trim_end_matches('/');

    let mut escaped = String::with_capacity(unified.len() + 8);
    for (i, c) in unified.chars().enumerate() {
        match c {
            '*' | '?' | '[' | ']' | '{' | '}' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            '!' | '#' if i == 0 => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
