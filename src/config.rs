/*!
 * Configuration handling for copcon
 */

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use clap_complete::Shell;

use crate::diagnostics::Diagnostics;
use crate::discovery::{discover_ignore_file, discover_target_file};
use crate::ensure;
use crate::error::Result;

/// Command-line arguments for copcon
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "copcon",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy a project's directory tree and file contents for AI assistants",
    long_about = "Renders the directory tree of a project together with the contents of every non-ignored file, then copies the result to the clipboard or writes it to a file."
)]
pub struct Args {
    /// Directory to snapshot
    #[clap(default_value = ".")]
    pub directory: PathBuf,

    /// Maximum tree depth to display (-1 for unlimited)
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    pub depth: i64,

    /// Exclude hidden files and directories from the file contents
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub exclude_hidden: bool,

    /// Comma-separated directory names to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_dirs: Vec<String>,

    /// Comma-separated file names to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_files: Vec<String>,

    /// Ignore file to use instead of auto-discovering `.copconignore`
    #[clap(long)]
    pub copconignore: Option<PathBuf>,

    /// Target file to use instead of auto-discovering `.copcontarget`
    #[clap(long)]
    pub copcontarget: Option<PathBuf>,

    /// Write the report to this file instead of the clipboard
    #[clap(long)]
    pub output_file: Option<PathBuf>,

    /// Append the uncommitted changes (git diff against HEAD)
    #[clap(long)]
    pub git_diff: bool,

    /// Log discovery and pattern details
    #[clap(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory to snapshot
    pub target_dir: PathBuf,

    /// Maximum tree depth; `None` for unlimited
    pub max_depth: Option<usize>,

    /// Whether hidden files are left out of the contents
    pub exclude_hidden: bool,

    /// Literal directory names to ignore
    pub ignore_dirs: HashSet<String>,

    /// Literal file names to ignore
    pub ignore_files: HashSet<String>,

    /// Ignore pattern file in effect, given or discovered
    pub ignore_file: Option<PathBuf>,

    /// Target pattern file in effect, given or discovered
    pub target_file: Option<PathBuf>,

    /// Whether the pattern files were given explicitly (and must exist)
    explicit_ignore: bool,
    explicit_target: bool,

    /// Report destination; `None` means the clipboard
    pub output_file: Option<PathBuf>,

    /// Append the git diff section
    pub git_diff: bool,
}

impl Config {
    /// Create configuration from command-line arguments.
    ///
    /// Pattern files not given explicitly are searched for from the target
    /// directory upward.
    pub fn from_args(args: Args, diagnostics: &dyn Diagnostics) -> Self {
        let explicit_ignore = args.copconignore.is_some();
        let explicit_target = args.copcontarget.is_some();

        let ignore_file = args
            .copconignore
            .or_else(|| discover_ignore_file(&args.directory, diagnostics));
        let target_file = args
            .copcontarget
            .or_else(|| discover_target_file(&args.directory, diagnostics));

        Self {
            max_depth: usize::try_from(args.depth).ok(),
            exclude_hidden: args.exclude_hidden,
            ignore_dirs: args.ignore_dirs.into_iter().collect(),
            ignore_files: args.ignore_files.into_iter().collect(),
            ignore_file,
            target_file,
            explicit_ignore,
            explicit_target,
            output_file: args.output_file,
            git_diff: args.git_diff,
            target_dir: args.directory,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "{} is not a valid directory",
            self.target_dir.display()
        );

        if self.explicit_ignore {
            if let Some(path) = &self.ignore_file {
                ensure!(
                    path.is_file(),
                    Config,
                    "Ignore file not found: {}",
                    path.display()
                );
            }
        }

        if self.explicit_target {
            if let Some(path) = &self.target_file {
                ensure!(
                    path.is_file(),
                    Config,
                    "Target file not found: {}",
                    path.display()
                );
            }
        }

        if let Some(parent) = self.output_file.as_ref().and_then(|p| p.parent()) {
            ensure!(
                parent.as_os_str().is_empty() || parent.is_dir(),
                PathNotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        Ok(())
    }

    /// Name printed above the tree
    pub fn project_name(&self) -> String {
        self.target_dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| self.target_dir.display().to_string())
    }
}
