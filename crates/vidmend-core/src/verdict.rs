//! Verdict engine: decides whether a file's container metadata can be trusted.
//!
//! [`diagnose`] is a pure function of its inputs. The divergence tolerance is
//! always an explicit argument; callers resolve it from configuration and pass
//! it down.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media::{FileTarget, MediaProbe, PacketTimeline};

/// Default relative divergence allowed between metadata and packet durations.
pub const DEFAULT_TOLERANCE: f64 = 0.20;

/// Declared durations at or below this are treated as missing.
pub const MIN_META_DURATION: f64 = 0.001;

/// Guards the divergence ratio against a zero denominator.
const DIVERGENCE_EPSILON: f64 = 1e-6;

/// Codecs whose timelines are unreliable inside MPEG program/transport streams.
const FRAGILE_MPEG_CODECS: &[&str] = &["h264", "hevc"];

/// Classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Metadata and packet timeline agree; nothing to do.
    Ok,
    /// Raw bitstream that needs a container.
    Wrap,
    /// Container timeline needs repair.
    Fix,
}

impl Verdict {
    /// Uppercase label used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::Wrap => "WRAP",
            Verdict::Fix => "FIX",
        }
    }

    /// Whether this verdict calls for a repair.
    pub fn needs_repair(&self) -> bool {
        !matches!(self, Verdict::Ok)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values computed while diagnosing, kept for reports and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Target extension (including the dot).
    pub extension: String,
    /// Probed container name.
    pub container: Option<String>,
    /// Probed video codec.
    pub video_codec: Option<String>,
    /// Probed start time in seconds.
    pub start_time: Option<f64>,
    /// Duration declared by the container, when usable.
    pub meta_duration: Option<f64>,
    /// Duration implied by the packet timeline.
    pub packet_duration: Option<f64>,
    /// Relative divergence between the two durations.
    pub divergence: Option<f64>,
}

/// Outcome of [`diagnose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// The classification.
    pub verdict: Verdict,
    /// Human-readable explanation.
    pub reason: String,
    /// Supporting values.
    pub diagnostics: Diagnostics,
}

impl Diagnosis {
    fn new(verdict: Verdict, reason: impl Into<String>, diagnostics: Diagnostics) -> Self {
        Self {
            verdict,
            reason: reason.into(),
            diagnostics,
        }
    }
}

/// Whether a container/codec pairing is known to produce broken timelines.
pub fn is_bad_combo(container: &str, video_codec: Option<&str>) -> bool {
    container.contains("mpeg")
        && video_codec.is_some_and(|codec| FRAGILE_MPEG_CODECS.contains(&codec))
}

/// Classify a file from its probe and packet timeline.
///
/// Checks run in a fixed order: raw bitstream, then missing metadata duration,
/// then untrustworthy packets, then divergence / bad-combo.
pub fn diagnose(
    target: &FileTarget,
    probe: &MediaProbe,
    timeline: &PacketTimeline,
    tolerance: f64,
) -> Diagnosis {
    let mut diagnostics = Diagnostics {
        extension: target.extension.clone(),
        container: probe.container.clone(),
        video_codec: probe.video_codec.clone(),
        start_time: probe.start_time,
        ..Diagnostics::default()
    };

    if target.is_raw_bitstream() {
        return Diagnosis::new(
            Verdict::Wrap,
            format!(
                "raw bitstream ({}) needs container + frame rate",
                target.extension
            ),
            diagnostics,
        );
    }

    let meta_duration = match probe.duration {
        Some(d) if d > MIN_META_DURATION => d,
        _ => {
            return match timeline.usable_span() {
                None => Diagnosis::new(
                    Verdict::Fix,
                    "no usable duration from metadata or packets",
                    diagnostics,
                ),
                Some(estimate) => {
                    diagnostics.packet_duration = Some(estimate);
                    Diagnosis::new(
                        Verdict::Fix,
                        format!("no metadata duration; packets suggest ~{estimate:.3}s"),
                        diagnostics,
                    )
                }
            };
        }
    };
    diagnostics.meta_duration = Some(meta_duration);

    let Some(span) = timeline.usable_span() else {
        return Diagnosis::new(
            Verdict::Fix,
            "metadata has duration but packet timestamps are not trustworthy \
             (players tend to freeze the playback clock)",
            diagnostics,
        );
    };

    let packet_duration = span.max(0.0);
    let divergence =
        (packet_duration - meta_duration).abs() / meta_duration.max(DIVERGENCE_EPSILON);
    let container = probe.container_name();
    let bad_combo = is_bad_combo(container, probe.video_codec.as_deref());
    diagnostics.packet_duration = Some(packet_duration);
    diagnostics.divergence = Some(divergence);

    let diverged = divergence > tolerance;
    if diverged || bad_combo {
        let mut reasons = Vec::with_capacity(2);
        if diverged {
            reasons.push(format!(
                "divergence {:.1}% (meta {meta_duration:.3}s vs packets {packet_duration:.3}s)",
                divergence * 100.0
            ));
        }
        if bad_combo {
            reasons.push(format!(
                "container '{container}' with {} is prone to a broken timeline",
                probe.video_codec.as_deref().unwrap_or_default()
            ));
        }
        return Diagnosis::new(Verdict::Fix, reasons.join("; "), diagnostics);
    }

    tracing::trace!(divergence, "timeline within tolerance");
    Diagnosis::new(
        Verdict::Ok,
        "metadata and packet timestamps agree",
        diagnostics,
    )
}
