//! Token counting for collected contents
//!
//! Counts tokens with the `cl100k_base` encoding and breaks the total down
//! by file extension for the summary table.

use std::collections::HashMap;
use std::path::Path;

use tiktoken_rs::CoreBPE;

use crate::error::{CopconError, Result};
use crate::reader::ContentMap;

/// Label used for files without an extension
pub const NO_EXTENSION: &str = "(no extension)";

/// Label used for the git diff section
pub const GIT_DIFF_LABEL: &str = "git diff";

/// Trait defining the interface for tokenizers
pub trait Tokenizer {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> usize;
}

/// Tokenizer backed by tiktoken's `cl100k_base` encoding
pub struct Cl100kTokenizer {
    encoding: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let encoding =
            tiktoken_rs::cl100k_base().map_err(|e| CopconError::Tokenizer(e.to_string()))?;
        Ok(Self { encoding })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.encoding.encode_ordinary(text).len()
    }
}

/// Token totals for one report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens across all files and the git diff
    pub total: usize,
    /// Tokens per extension, largest first
    pub by_extension: Vec<(String, usize)>,
}

/// Count tokens per file and group them by extension
pub fn count_usage(
    contents: &ContentMap,
    git_diff: Option<&str>,
    tokenizer: &dyn Tokenizer,
) -> TokenUsage {
    let mut by_extension: HashMap<String, usize> = HashMap::new();
    let mut total = 0;

    for (path, content) in contents.iter() {
        let tokens = tokenizer.count_tokens(content);
        total += tokens;
        *by_extension.entry(extension_of(path)).or_default() += tokens;
    }

    if let Some(diff) = git_diff {
        let tokens = tokenizer.count_tokens(diff);
        total += tokens;
        *by_extension.entry(GIT_DIFF_LABEL.to_string()).or_default() += tokens;
    }

    let mut by_extension: Vec<(String, usize)> = by_extension.into_iter().collect();
    by_extension.sort_by(|(a_ext, a), (b_ext, b)| b.cmp(a).then_with(|| a_ext.cmp(b_ext)));

    TokenUsage {
        total,
        by_extension,
    }
}

/// Everything from the first `.` of the file name, e.g. `.tar.gz`
pub fn extension_of(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.find('.') {
        Some(idx) => name[idx..].to_string(),
        None => NO_EXTENSION.to_string(),
    }
}
