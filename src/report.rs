/*!
 * Report assembly and run summary
 *
 * Builds the text snapshot handed to the AI assistant, and the summary
 * printed to the console afterwards, using the tabled library for the token
 * distribution table.
 */

use std::fs;
use std::path::{Path, PathBuf};

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::reader::ContentMap;
use crate::tokenizer::TokenUsage;

/// Rule placed above and below every file's content
const SEPARATOR_WIDTH: usize = 40;

/// The snapshot text: tree, file contents and an optional git diff
pub struct Report<'a> {
    /// Name printed above the tree, usually the directory name
    pub project_name: &'a str,
    /// Rendered directory tree
    pub tree: &'a str,
    pub contents: &'a ContentMap,
    pub git_diff: Option<&'a str>,
}

impl Report<'_> {
    /// Render the report text
    pub fn render(&self) -> String {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let mut lines: Vec<String> = vec![
            "Directory Structure:".to_string(),
            self.project_name.to_string(),
            self.tree.to_string(),
            "\nFile Contents:".to_string(),
        ];

        for (path, content) in self.contents.iter() {
            lines.push(format!("\nFile: {}", path));
            lines.push(separator.clone());
            lines.push(content.to_string());
            lines.push(separator.clone());
        }

        if let Some(diff) = self.git_diff {
            lines.push("\nGit Diff:".to_string());
            lines.push(diff.to_string());
        }

        lines.join("\n")
    }
}

/// Write report text to `path`
pub fn write_report(report: &str, path: &Path) -> Result<()> {
    fs::write(path, report)?;
    log::info!("Output written to {}", path.display());
    Ok(())
}

/// Where the report ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    File(PathBuf),
    Clipboard,
}

/// Everything the closing summary reports
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub directory_count: usize,
    pub file_count: usize,
    pub usage: TokenUsage,
    pub ignore_file: Option<PathBuf>,
    pub target_file: Option<PathBuf>,
    pub delivery: Delivery,
}

impl RunSummary {
    /// Render the console summary
    pub fn render(&self) -> String {
        let mut message = format!(
            "🎉 Success! Copcon has processed:\n\n\
             📁 {} directories\n\
             📄 {} files\n\
             🔢 {} tokens\n\n\
             {}\n\n",
            format_count(self.directory_count),
            format_count(self.file_count),
            format_count(self.usage.total),
            self.distribution_table(),
        );

        if let Some(path) = &self.target_file {
            message.push_str(&format!("Using `.copcontarget` from: {}\n", path.display()));
        }
        if let Some(path) = &self.ignore_file {
            message.push_str(&format!("Using `.copconignore` from: {}\n", path.display()));
        }

        match &self.delivery {
            Delivery::File(path) => message.push_str(&format!(
                "\nThe report has been written to `{}` 🚀\n",
                path.display()
            )),
            Delivery::Clipboard => {
                message.push_str("\nThe report has been copied to your clipboard 🚀\n")
            }
        }

        message
    }

    // Token distribution per extension using the tabled crate
    fn distribution_table(&self) -> String {
        #[derive(Tabled)]
        struct ExtensionRow {
            #[tabled(rename = "File Extension")]
            extension: String,

            #[tabled(rename = "Tokens")]
            tokens: String,

            #[tabled(rename = "Token Distribution")]
            share: String,
        }

        // Avoid dividing by zero for empty projects
        let total = self.usage.total.max(1);

        let mut rows: Vec<ExtensionRow> = self
            .usage
            .by_extension
            .iter()
            .map(|(extension, tokens)| ExtensionRow {
                extension: extension.clone(),
                tokens: format_count(*tokens),
                share: format!("{:.1}%", *tokens as f64 * 100.0 / total as f64),
            })
            .collect();

        rows.push(ExtensionRow {
            extension: "Total".to_string(),
            tokens: format_count(self.usage.total),
            share: "100.0%".to_string(),
        });

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()));

        table.to_string()
    }
}

/// Format a count with thousands separators, e.g. `12,345`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
