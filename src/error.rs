//! Global error handling for copcon
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::clipboard::ClipboardError;
use crate::reader::ContentMap;

/// Global error type for copcon operations
#[derive(Error, Debug)]
pub enum CopconError {
    /// Bundled or user-supplied pattern files that are missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more files could not be read during content collection
    #[error("{0}")]
    Read(ReadFailures),

    /// Clipboard-related errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Token counting errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for copcon operations
pub type Result<T> = std::result::Result<T, CopconError>;

/// A single file that could not be read
#[derive(Debug)]
pub struct FileReadFailure {
    /// Path relative to the collection root
    pub path: PathBuf,
    /// Underlying cause
    pub source: io::Error,
}

/// Aggregate of every read failure from one content collection pass.
///
/// The files that were read successfully before and after each failure are
/// kept in `partial`, so callers can still inspect them.
#[derive(Debug)]
pub struct ReadFailures {
    pub failures: Vec<FileReadFailure>,
    pub partial: ContentMap,
}

impl ReadFailures {
    /// Paths of every file that failed, in walk order
    pub fn failed_paths(&self) -> Vec<&PathBuf> {
        self.failures.iter().map(|f| &f.path).collect()
    }
}

impl fmt::Display for ReadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Encountered errors while reading {} file(s):",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.path.display(), failure.source)?;
        }
        Ok(())
    }
}

/// Creates a CopconError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CopconError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
