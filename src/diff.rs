/*!
 * Git diff of uncommitted changes
 */

use std::fs;
use std::path::Path;

use git2::{DiffFormat, DiffOptions, Repository};

/// Shown in place of an empty diff
pub const NO_CHANGES: &str = "[No uncommitted changes]";

/// Patch of the working tree (index included) against `HEAD`, limited to
/// `dir` when it lies inside the repository.
pub fn diff_against_head(dir: &Path) -> Result<String, git2::Error> {
    let repo = Repository::discover(dir)?;

    // An unborn HEAD diffs against the empty tree
    let head_tree = repo.head().ok().and_then(|head| head.peel_to_tree().ok());

    let mut options = DiffOptions::new();
    if let Some(pathspec) = pathspec_within(&repo, dir) {
        options.pathspec(pathspec);
    }

    let diff = repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut options))?;

    let mut patch = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if let origin @ ('+' | '-' | ' ') = line.origin() {
            patch.push(origin);
        }
        patch.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    Ok(patch)
}

/// Diff text for the report; failures become a note instead of an error
pub fn diff_section(dir: &Path) -> String {
    match diff_against_head(dir) {
        Ok(patch) if patch.trim().is_empty() => NO_CHANGES.to_string(),
        Ok(patch) => patch,
        Err(e) => {
            log::warn!("Git diff failed for {}: {}", dir.display(), e.message());
            format!("[Git diff could not be generated: {}]", e.message())
        }
    }
}

fn pathspec_within(repo: &Repository, dir: &Path) -> Option<String> {
    let workdir = fs::canonicalize(repo.workdir()?).ok()?;
    let dir = fs::canonicalize(dir).ok()?;
    let relative = dir.strip_prefix(&workdir).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_string_lossy().replace('\\', "/"))
}
