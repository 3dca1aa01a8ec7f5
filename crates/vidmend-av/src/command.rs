//! Builder for executing external tool commands with timeout support.
//!
//! Two execution styles are offered: [`ToolCommand::execute`] waits for the
//! process and captures its output, while [`ToolCommand::spawn_lines`] hands
//! back a [`ToolLines`] reader so very large outputs (millions of packet
//! lines) are consumed incrementally instead of buffered. Streamed lines are
//! decoded lossily, so a stray non-UTF-8 byte spoils one line, not the read.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Split};
use tokio::process::{Child, ChildStdout, Command};

use vidmend_core::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use vidmend_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> vidmend_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .args(["-v", "error", "-print_format", "json", "-show_format"])
///     .arg("/dvr/cam1.mp4")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path. No timeout is set.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append a path argument.
    pub fn path_arg(&mut self, p: &Path) -> &mut Self {
        self.args.push(p.to_string_lossy().into_owned());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set (or clear) the maximum execution time.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    /// The arguments collected so far.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Short program name used in errors and logs.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        // Dropping the wait future on timeout must not leave the child running.
        cmd.kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::tool_missing(self.program_name())
        } else {
            Error::tool(self.program_name(), format!("failed to spawn: {e}"))
        }
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the process outlives the configured timeout
    ///   (the process is killed).
    /// - [`Error::Tool`] if the process exits with a non-zero status (message
    ///   includes stderr) or cannot be spawned.
    /// - [`Error::ToolMissing`] if the program does not exist.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();
        tracing::debug!(tool = %program_name, args = ?self.args, "executing");

        let mut cmd = self.command();
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        let wait = child.wait_with_output();

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(r) => r,
                Err(_elapsed) => {
                    tracing::warn!(tool = %program_name, "timed out after {limit:?}");
                    return Err(Error::Timeout {
                        tool: program_name,
                        after: limit,
                    });
                }
            },
            None => wait.await,
        };

        let output = result.map_err(|e| {
            Error::tool(
                program_name.clone(),
                format!("I/O error waiting for process: {e}"),
            )
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool(
                program_name,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            ));
        }

        Ok(tool_output)
    }

    /// Spawn the command and stream its stdout line by line.
    ///
    /// Stderr is discarded. The configured timeout is carried by the returned
    /// reader and applies to the whole read.
    pub fn spawn_lines(&self) -> Result<ToolLines> {
        let mut cmd = self.command();
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::tool(self.program_name(), "stdout was not captured"))?;

        Ok(ToolLines {
            tool: self.program_name(),
            child,
            lines: BufReader::new(stdout).split(b'\n'),
            timeout: self.timeout,
        })
    }
}

/// Incremental reader over a running tool's stdout.
#[derive(Debug)]
pub struct ToolLines {
    tool: String,
    child: Child,
    lines: Split<BufReader<ChildStdout>>,
    timeout: Option<Duration>,
}

impl ToolLines {
    /// Read the next line, `None` at end of output.
    ///
    /// Invalid UTF-8 is replaced rather than reported.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        let segment = self
            .lines
            .next_segment()
            .await
            .map_err(|e| Error::tool(self.tool.clone(), format!("failed to read output: {e}")))?;
        Ok(segment.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Name of the tool being read.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Time budget for the whole read, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Kill the process without waiting for more output.
    pub async fn abort(mut self) {
        let _ = self.child.kill().await;
    }
}
