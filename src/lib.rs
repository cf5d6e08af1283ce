/*!
 * Copcon - snapshot a project directory for AI assistant context
 *
 * This library renders a project's directory tree and collects the contents
 * of every file that survives the ignore/target filters, producing a single
 * text report.
 */

pub mod clipboard;
pub mod config;
pub mod diagnostics;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod reader;
pub mod report;
pub mod tokenizer;
pub mod tree;


// Re-export main components for easier access
pub use config::{Args, Config};
pub use diagnostics::{Diagnostics, LogDiagnostics, ScanEvent};
pub use discovery::find_upward;
pub use error::{CopconError, Result};
pub use filter::{FileFilter, PathFilter};
pub use pattern::PatternSpec;
pub use reader::{ContentMap, ContentReader};
pub use report::{Delivery, Report, RunSummary};
pub use tree::{DirectoryTree, TreeRenderer};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
