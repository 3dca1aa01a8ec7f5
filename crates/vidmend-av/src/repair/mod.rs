//! Repair strategies and the ordered chain that runs them.
//!
//! Every strategy is a single ffmpeg invocation behind the [`RepairStrategy`]
//! trait. A [`RepairChain`] tries its strategies in order and stops at the
//! first one whose output exists and is non-empty; a zero exit status alone is
//! not trusted.

mod faststart;
mod reencode;
mod remux;
mod wrap;

pub use faststart::FaststartCopy;
pub use reencode::{EncodeSettings, Reencode};
pub use remux::Remux;
pub use wrap::Wrap;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use vidmend_core::config::RepairConfig;
use vidmend_core::{Error, Result, Verdict};

use crate::command::ToolCommand;
use crate::replace::{self, Placement};
use crate::tools::ToolRegistry;

/// Arguments shared by every ffmpeg invocation.
const FFMPEG_PRELUDE: &[&str] = &["-y", "-hide_banner", "-loglevel", "error", "-fflags", "+genpts"];

/// Container produced when the caller has a choice between MP4 and Matroska.
pub(crate) fn preferred_extension(prefer_mkv: bool) -> &'static str {
    if prefer_mkv {
        "mkv"
    } else {
        "mp4"
    }
}

// ---------------------------------------------------------------------------
// Strategy families
// ---------------------------------------------------------------------------

/// The kind of operation a strategy performs. Failure tags and output names
/// are per family, not per candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyFamily {
    Wrap,
    Remux,
    Faststart,
    Reencode,
}

impl StrategyFamily {
    /// Tag reported when this family was the last one attempted and failed.
    pub fn failure_tag(self) -> &'static str {
        match self {
            StrategyFamily::Wrap => "wrap_failed",
            StrategyFamily::Remux => "remux_failed",
            StrategyFamily::Faststart => "faststart_failed",
            StrategyFamily::Reencode => "reencode_failed",
        }
    }

    /// Marker inserted between the stem and the extension of output names.
    pub fn name_marker(self) -> &'static str {
        match self {
            StrategyFamily::Wrap => "_wrapped",
            StrategyFamily::Remux | StrategyFamily::Faststart => "_fixed",
            StrategyFamily::Reencode => "_reenc",
        }
    }

    /// The family-specific error kind.
    pub fn error(self, detail: impl Into<String>) -> Error {
        let detail = detail.into();
        match self {
            StrategyFamily::Wrap => Error::WrapFailed(detail),
            StrategyFamily::Remux => Error::RemuxFailed(detail),
            StrategyFamily::Faststart => Error::FaststartFailed(detail),
            StrategyFamily::Reencode => Error::ReencodeFailed(detail),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// One way of producing a repaired copy of a file.
#[async_trait]
pub trait RepairStrategy: Send + Sync {
    /// Action tag reported on success, e.g. `wrap(25)` or `remux_mkv`.
    fn tag(&self) -> String;

    fn family(&self) -> StrategyFamily;

    /// Extension (without dot) of the file this strategy writes.
    fn output_extension(&self) -> &'static str;

    /// Append the strategy-specific ffmpeg arguments, ending with `output`.
    fn configure(&self, cmd: &mut ToolCommand, input: &Path, output: &Path);

    /// Stem suffix for side-by-side output.
    fn output_suffix(&self) -> String {
        self.family().name_marker().to_string()
    }

    /// Where the result is written when the original is left untouched.
    fn side_by_side_path(&self, input: &Path) -> PathBuf {
        sibling(input, &self.output_suffix(), self.output_extension())
    }

    /// Where the result is staged before replacing the original.
    fn temp_path(&self, input: &Path) -> PathBuf {
        let suffix = format!("{}_tmp", self.family().name_marker());
        sibling(input, &suffix, self.output_extension())
    }

    /// Run the strategy once, writing to `output`.
    ///
    /// Fails with the family's error kind unless ffmpeg exits successfully
    /// and leaves a non-empty file behind.
    async fn attempt(&self, tools: &ToolRegistry, input: &Path, output: &Path) -> Result<()> {
        let family = self.family();
        let mut cmd = ffmpeg_command(tools).map_err(|e| family.error(e.to_string()))?;
        self.configure(&mut cmd, input, output);
        cmd.execute()
            .await
            .map_err(|e| family.error(e.to_string()))?;
        verify_output(output).map_err(|detail| family.error(detail))
    }
}

/// An ffmpeg command with the shared prelude already applied.
pub fn ffmpeg_command(tools: &ToolRegistry) -> Result<ToolCommand> {
    let mut cmd = tools.command("ffmpeg")?;
    cmd.args(FFMPEG_PRELUDE.iter().copied());
    Ok(cmd)
}

/// `<dir>/<stem><suffix>.<ext>` next to `input`.
pub fn sibling(input: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}

fn verify_output(output: &Path) -> std::result::Result<(), String> {
    match std::fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(format!("{} is empty", output.display())),
        Err(_) => Err(format!("{} was not produced", output.display())),
    }
}

/// Remove whatever a failed attempt left behind.
fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("could not remove partial output {}: {e}", path.display()),
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of running a [`RepairChain`] against one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairOutcome {
    pub strategy_tag: String,
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub error_detail: Option<String>,
}

impl RepairOutcome {
    fn succeeded(tag: String, output: PathBuf) -> Self {
        Self {
            strategy_tag: tag,
            success: true,
            output_path: Some(output),
            error_detail: None,
        }
    }

    fn failed(tag: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            strategy_tag: tag.into(),
            success: false,
            output_path: None,
            error_detail: Some(detail.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered, short-circuiting list of repair strategies.
pub struct RepairChain {
    strategies: Vec<Box<dyn RepairStrategy>>,
    exhausted_tag: &'static str,
}

impl RepairChain {
    /// Build a chain from an explicit strategy list. `exhausted_tag` is
    /// reported if the list is empty.
    pub fn new(strategies: Vec<Box<dyn RepairStrategy>>, exhausted_tag: &'static str) -> Self {
        Self {
            strategies,
            exhausted_tag,
        }
    }

    /// Wrap a raw bitstream, one candidate per frame rate.
    pub fn wrap(frame_rates: &[u32], prefer_mkv: bool) -> Self {
        let strategies = frame_rates
            .iter()
            .map(|&fps| Box::new(Wrap::new(fps, prefer_mkv)) as Box<dyn RepairStrategy>)
            .collect();
        Self::new(strategies, StrategyFamily::Wrap.failure_tag())
    }

    /// Remux, then faststart copy, then CFR re-encode (auto, then each frame rate).
    pub fn fix(settings: &RepairConfig) -> Self {
        let encode = EncodeSettings::from(settings);
        let mut strategies: Vec<Box<dyn RepairStrategy>> =
            vec![Box::new(Remux), Box::new(FaststartCopy)];
        strategies.push(Box::new(Reencode::new(None, encode.clone())));
        for &fps in &settings.frame_rates {
            strategies.push(Box::new(Reencode::new(Some(fps), encode.clone())));
        }
        Self::new(strategies, StrategyFamily::Reencode.failure_tag())
    }

    /// The chain that repairs a file with the given verdict, `None` for OK.
    pub fn for_verdict(verdict: Verdict, settings: &RepairConfig) -> Option<Self> {
        match verdict {
            Verdict::Ok => None,
            Verdict::Wrap => Some(Self::wrap(&settings.frame_rates, settings.prefer_mkv)),
            Verdict::Fix => Some(Self::fix(settings)),
        }
    }

    /// Success tags of every strategy, in attempt order.
    pub fn tags(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.tag()).collect()
    }

    /// Try each strategy in turn and promote the first good result.
    ///
    /// When every strategy fails the original file is untouched and the
    /// outcome carries the failure tag of the last family attempted.
    pub async fn run(
        &self,
        tools: &ToolRegistry,
        input: &Path,
        placement: Placement,
    ) -> RepairOutcome {
        let mut last_failure: Option<(&'static str, String)> = None;

        for strategy in &self.strategies {
            let tag = strategy.tag();
            let dest = match placement {
                Placement::SideBySide => strategy.side_by_side_path(input),
                Placement::InPlace => strategy.temp_path(input),
            };

            tracing::info!(strategy = %tag, "repairing {}", input.display());
            match strategy.attempt(tools, input, &dest).await {
                Ok(()) => return promote(strategy.as_ref(), tag, input, dest, placement),
                Err(e) => {
                    tracing::warn!(strategy = %tag, "{e}");
                    discard_partial(&dest);
                    last_failure = Some((strategy.family().failure_tag(), e.to_string()));
                }
            }
        }

        match last_failure {
            Some((tag, detail)) => RepairOutcome::failed(tag, detail),
            None => RepairOutcome::failed(self.exhausted_tag, "no repair candidates configured"),
        }
    }
}

fn promote(
    strategy: &dyn RepairStrategy,
    tag: String,
    input: &Path,
    produced: PathBuf,
    placement: Placement,
) -> RepairOutcome {
    match placement {
        Placement::SideBySide => {
            tracing::info!(strategy = %tag, "wrote {}", produced.display());
            RepairOutcome::succeeded(tag, produced)
        }
        Placement::InPlace => {
            let tag = format!("{tag} inplace");
            let final_path = input.with_extension(strategy.output_extension());
            match replace::promote(input, &produced, &final_path) {
                Ok(path) => {
                    tracing::info!(strategy = %tag, "replaced {}", path.display());
                    RepairOutcome::succeeded(tag, path)
                }
                Err(e) => {
                    tracing::error!(strategy = %tag, "{e}");
                    // Once the original has moved to its backup the staged
                    // file is the only copy of the repair.
                    if input.exists() {
                        discard_partial(&produced);
                    } else {
                        tracing::warn!("repaired copy kept at {}", produced.display());
                    }
                    RepairOutcome::failed(strategy.family().failure_tag(), e.to_string())
                }
            }
        }
    }
}
