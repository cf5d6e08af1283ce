/*!
 * Diagnostics reporting for the filtering and traversal components
 *
 * Components never log directly; they hand events to an injected
 * `Diagnostics` sink so tests can observe them without capturing output.
 */

use std::path::PathBuf;
use std::sync::Arc;

/// Something worth telling the user about during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A pattern source was compiled
    PatternsLoaded { source: String, patterns: usize },
    /// A pattern line failed to parse and is matched literally instead
    PatternDegraded { source: String, line: String },
    /// A pattern line was rejected even in literal form and is dropped
    PatternRejected { source: String, line: String, error: String },
    /// A configuration file was found by walking up from the start directory
    ConfigDiscovered { path: PathBuf },
    /// A directory could not be listed while rendering the tree
    DirectoryUnreadable { path: PathBuf, error: String },
    /// A file could not be read while collecting contents
    FileUnreadable { path: PathBuf, error: String },
}

/// Receiver for scan events
pub trait Diagnostics: Send + Sync {
    /// Called once per event
    fn record(&self, event: &ScanEvent);
}

// Closures make convenient sinks in tests
impl<F> Diagnostics for F
where
    F: Fn(&ScanEvent) + Send + Sync,
{
    fn record(&self, event: &ScanEvent) {
        self(event)
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn record(&self, event: &ScanEvent) {
        match event {
            ScanEvent::PatternsLoaded { source, patterns } => {
                log::debug!("Loaded {} pattern(s) from {}", patterns, source)
            }
            ScanEvent::PatternDegraded { source, line } => {
                log::warn!("Pattern '{}' in {} is invalid, matching it literally", line, source)
            }
            ScanEvent::PatternRejected { source, line, error } => {
                log::warn!("Dropping pattern '{}' in {}: {}", line, source, error)
            }
            ScanEvent::ConfigDiscovered { path } => {
                log::debug!("Auto-discovered {}", path.display())
            }
            ScanEvent::DirectoryUnreadable { path, error } => {
                log::warn!("Cannot list {}: {}", path.display(), error)
            }
            ScanEvent::FileUnreadable { path, error } => {
                log::warn!("Skipping file {}: {}", path.display(), error)
            }
        }
    }
}

/// Default sink used when a component is not given one
pub fn default_diagnostics() -> Arc<dyn Diagnostics> {
    Arc::new(LogDiagnostics)
}
