//! Read-only inspection of media files: container metadata and the packet
//! timeline of the primary video stream.

mod ffprobe;
mod packets;

pub use ffprobe::{parse_ffprobe_json, probe_metadata};
pub use packets::{parse_pts_line, sample_timeline, PacketTimestamps};

/// Analysis bounds large enough for multi-gigabyte recordings.
pub(crate) const ANALYZE_BOUNDS: &[&str] = &["-analyzeduration", "200M", "-probesize", "200M"];
