//! Configuration types.
//!
//! The top-level [`Config`] is deserialized from TOML by the binary. Every
//! section defaults sensibly so an empty file is valid; command-line flags
//! override individual fields before the values are passed down explicitly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::media::{normalize_extension, VIDEO_EXTENSIONS};
use crate::verdict::DEFAULT_TOLERANCE;

/// Default time budget for one external invocation: 6 hours.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 6 * 60 * 60;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub diagnosis: DiagnosisConfig,
    pub repair: RepairConfig,
    pub scan: ScanConfig,
}

impl Config {
    /// Check value ranges across all sections.
    pub fn validate(&self) -> Result<()> {
        self.diagnosis.validate()?;
        self.repair.validate()?;
        self.scan.validate()
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// External tool overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    /// Seconds before an external invocation is killed; `0` disables the limit.
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl ToolsConfig {
    /// The configured timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Verdict engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisConfig {
    /// Relative divergence tolerated between metadata and packet durations.
    pub tolerance: f64,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl DiagnosisConfig {
    fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::Config(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Repair chain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Candidate frame rates, tried in order.
    pub frame_rates: Vec<u32>,
    /// Produce Matroska instead of MP4 where the strategy allows a choice.
    pub prefer_mkv: bool,
    /// Replace originals (keeping a `.bak`) instead of writing side-by-side.
    pub in_place: bool,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            frame_rates: vec![25, 30],
            prefer_mkv: false,
            in_place: false,
            video_codec: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 20,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

impl RepairConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_rates.is_empty() {
            return Err(Error::Config("at least one frame rate is required".into()));
        }
        if self.frame_rates.iter().any(|&fps| fps == 0) {
            return Err(Error::Config("frame rates must be positive".into()));
        }
        if self.crf > 51 {
            return Err(Error::Config(format!(
                "crf must be within 0..=51, got {}",
                self.crf
            )));
        }
        if self.video_codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(Error::Config("codec names cannot be empty".into()));
        }
        Ok(())
    }
}

/// Target selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions picked up when walking a directory.
    pub extensions: Vec<String>,
    /// Files processed concurrently.
    pub jobs: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            jobs: 1,
        }
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether a file extension (with or without the dot) is scanned.
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        !ext.is_empty()
            && self
                .extensions
                .iter()
                .any(|e| normalize_extension(e) == ext)
    }
}
