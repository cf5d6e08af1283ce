/*!
 * System clipboard delivery
 *
 * Pipes the report into whichever clipboard command the platform offers.
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to run or talk to the clipboard command
    #[error("{command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// No suitable clipboard mechanism was found
    #[error("No clipboard command available (tried tmux, wl-copy, xsel, xclip, pbcopy, clip.exe, termux-clipboard-set)")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Something that accepts text for the clipboard
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// A clipboard reached through an external command reading stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandClipboard {
    program: &'static str,
    args: &'static [&'static str],
}

const TMUX: CommandClipboard = CommandClipboard {
    program: "tmux",
    args: &["load-buffer", "-w", "-"],
};
const WAYLAND: CommandClipboard = CommandClipboard {
    program: "wl-copy",
    args: &[],
};
const XSEL: CommandClipboard = CommandClipboard {
    program: "xsel",
    args: &["-b", "-i"],
};
const XCLIP: CommandClipboard = CommandClipboard {
    program: "xclip",
    args: &["-selection", "clipboard", "-in"],
};
const PBCOPY: CommandClipboard = CommandClipboard {
    program: "pbcopy",
    args: &[],
};
const CLIP_EXE: CommandClipboard = CommandClipboard {
    program: "clip.exe",
    args: &[],
};
const TERMUX: CommandClipboard = CommandClipboard {
    program: "termux-clipboard-set",
    args: &[],
};

impl CommandClipboard {
    pub fn program(&self) -> &'static str {
        self.program
    }
}

impl Clipboard for CommandClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let failed = |reason: String| ClipboardError::CommandFailed {
            command: self.program.to_string(),
            reason,
        };

        let mut child = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| failed("stdin unavailable".to_string()))?;
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
        }
        // Close stdin so the command sees EOF
        drop(child.stdin.take());

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("exited with {}", status)))
        }
    }
}

/// Copy text with the first clipboard command available on this system
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let clipboard = detect_clipboard().ok_or(ClipboardError::NoClipboardFound)?;
    log::debug!("Copying report with {}", clipboard.program());
    clipboard.copy(text)
}

/// Pick a clipboard command, preferring a running tmux session
pub fn detect_clipboard() -> Option<CommandClipboard> {
    candidates()
        .into_iter()
        .find(|candidate| command_exists(candidate.program))
}

fn candidates() -> Vec<CommandClipboard> {
    let mut candidates = Vec::new();
    if env::var_os("TMUX").is_some() {
        candidates.push(TMUX);
    }

    if cfg!(target_os = "macos") {
        candidates.push(PBCOPY);
    } else if cfg!(target_os = "windows") || env::var_os("WSL_DISTRO_NAME").is_some() {
        candidates.push(CLIP_EXE);
    } else if cfg!(target_os = "android") {
        candidates.push(TERMUX);
    } else {
        if env::var_os("WAYLAND_DISPLAY").is_some() {
            candidates.push(WAYLAND);
        }
        candidates.extend([XSEL, XCLIP, WAYLAND]);
    }
    candidates
}

/// Check if a command exists on the PATH
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_candidates_are_not_empty() {
        assert!(!candidates().is_empty());
    }

    #[test]
    fn test_copy_through_command_reads_stdin() {
        if !command_exists("cat") {
            return;
        }
        let cat = CommandClipboard {
            program: "cat",
            args: &[],
        };
        assert!(cat.copy("report text").is_ok());
    }

    #[test]
    fn test_failing_command_is_an_error() {
        if !command_exists("false") {
            return;
        }
        let broken = CommandClipboard {
            program: "false",
            args: &[],
        };
        let err = broken.copy("ignored").unwrap_err();
        assert!(err.to_string().starts_with("false failed"));
    }
}
