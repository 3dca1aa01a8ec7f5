//! Unified error type for vidmend.
//!
//! Probe and packet-sampling failures are recovered locally and never reach
//! the caller as an [`Error`]; everything else funnels through this enum so the
//! orchestrator can decide between "this file failed" and "abort the run" via
//! [`Error::is_fatal`] and [`Error::exit_code`].

use std::path::PathBuf;
use std::time::Duration;

/// Exit status used for startup-level failures (missing tools, missing input).
pub const EXIT_STARTUP_FAILURE: i32 = 2;

/// Unified error type covering all failure modes in vidmend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool could not be located.
    #[error("{tool} not found; is it installed and in PATH?")]
    ToolMissing {
        /// Name of the missing tool.
        tool: String,
    },

    /// The input path given to the run does not exist.
    #[error("Input not found: {}", path.display())]
    InputNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// An external tool could not be spawned or exited unsuccessfully.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool exceeded its time budget and was killed.
    #[error("Tool error [{tool}]: timed out after {after:?}")]
    Timeout {
        /// Name of the tool that timed out.
        tool: String,
        /// The budget that was exceeded.
        after: Duration,
    },

    /// Inspector output could not be interpreted.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Wrapping a raw bitstream failed.
    #[error("Wrap failed: {0}")]
    WrapFailed(String),

    /// Lossless remux into the alternate container failed.
    #[error("Remux failed: {0}")]
    RemuxFailed(String),

    /// Faststart/timescale stream copy failed.
    #[error("Faststart copy failed: {0}")]
    FaststartFailed(String),

    /// Constant-frame-rate re-encode failed.
    #[error("Re-encode failed: {0}")]
    ReencodeFailed(String),

    /// A stale backup existed and could not be removed.
    #[error("Failed to remove backup {}: {source}", path.display())]
    BackupRemovalFailed {
        /// The backup path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Promoting a repaired file failed part-way.
    #[error("Failed to replace {}: {message}", path.display())]
    Replace {
        /// The path being replaced.
        path: PathBuf,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration failed validation.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error must abort the whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ToolMissing { .. } | Error::InputNotFound { .. })
    }

    /// Process exit status for this error when it terminates the run.
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_STARTUP_FAILURE
        } else {
            1
        }
    }

    /// Convenience constructor for [`Error::ToolMissing`].
    pub fn tool_missing(tool: impl Into<String>) -> Self {
        Error::ToolMissing { tool: tool.into() }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Replace`].
    pub fn replace(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Replace {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
