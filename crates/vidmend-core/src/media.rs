//! Media-domain types shared by the probe, the verdict engine and the
//! repair chain.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions of raw elementary bitstreams (no container, no timing).
pub const RAW_EXTENSIONS: &[&str] = &[".h264", ".hevc", ".dav"];

/// Extensions picked up when scanning a directory.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".mov", ".mkv", ".avi", ".ts", ".m2ts", ".flv", ".webm", ".3gp", ".mpg", ".mpeg",
    ".wmv", ".asf", ".m4v", ".h264", ".hevc", ".dav",
];

/// Normalise an extension to lowercase with a leading dot (`"MP4"` -> `".mp4"`).
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_ascii_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

// ---------------------------------------------------------------------------
// FileTarget
// ---------------------------------------------------------------------------

/// A file selected for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTarget {
    /// Path to the file.
    pub path: PathBuf,
    /// Lowercased extension including the dot, empty if the file has none.
    pub extension: String,
}

impl FileTarget {
    /// Build a target from a path, deriving its extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .map(|e| normalize_extension(&e.to_string_lossy()))
            .unwrap_or_default();
        Self { path, extension }
    }

    /// Whether the extension marks a raw elementary bitstream.
    pub fn is_raw_bitstream(&self) -> bool {
        RAW_EXTENSIONS.contains(&self.extension.as_str())
    }

    /// The target path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// MediaProbe
// ---------------------------------------------------------------------------

/// Container-level facts reported by the inspector.
///
/// Every field may be `None`; a fully-null probe is how an unreadable or
/// unparseable file is represented, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Declared duration in seconds.
    pub duration: Option<f64>,
    /// Container format name, e.g. `"mpegts"` or `"mov,mp4,m4a,3gp,3g2,mj2"`.
    pub container: Option<String>,
    /// Codec of the (last) video stream.
    pub video_codec: Option<String>,
    /// Declared start time in seconds.
    pub start_time: Option<f64>,
}

impl MediaProbe {
    /// The probe reported when the inspector fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Container name, or the empty string when unknown.
    pub fn container_name(&self) -> &str {
        self.container.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// PacketTimeline
// ---------------------------------------------------------------------------

/// First and most recent presentation timestamps of the primary video stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketTimeline {
    /// First timestamp seen, in seconds.
    pub first_pts: Option<f64>,
    /// Most recently seen timestamp, in seconds.
    pub last_pts: Option<f64>,
}

impl PacketTimeline {
    /// Build a timeline from explicit values.
    pub fn new(first_pts: Option<f64>, last_pts: Option<f64>) -> Self {
        Self {
            first_pts,
            last_pts,
        }
    }

    /// Fold a sequence of timestamps. No ordering is assumed.
    pub fn from_timestamps<I: IntoIterator<Item = f64>>(timestamps: I) -> Self {
        let mut timeline = Self::default();
        for pts in timestamps {
            timeline.observe(pts);
        }
        timeline
    }

    /// Record one packet timestamp.
    pub fn observe(&mut self, pts: f64) {
        if self.first_pts.is_none() {
            self.first_pts = Some(pts);
        }
        self.last_pts = Some(pts);
    }

    /// `last - first` when both are known and `last > first`.
    pub fn usable_span(&self) -> Option<f64> {
        match (self.first_pts, self.last_pts) {
            (Some(first), Some(last)) if last > first => Some(last - first),
            _ => None,
        }
    }
}
