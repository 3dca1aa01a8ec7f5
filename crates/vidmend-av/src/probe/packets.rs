//! Packet timeline sampler.
//!
//! Lists `pts_time` for every packet of the first video stream and keeps only
//! the first and the most recent value. The output of a long DVR recording can
//! run to millions of lines, so it is consumed as a stream.

use std::path::Path;

use vidmend_core::{Error, PacketTimeline, Result};

use super::ANALYZE_BOUNDS;
use crate::command::ToolLines;
use crate::tools::ToolRegistry;

/// Read interval covering the whole file regardless of declared duration.
const READ_ALL_PACKETS: &str = "%+#999999";

/// Sample the primary video stream's first and last presentation timestamps.
///
/// Any failure (tool missing, spawn error, timeout) yields an empty timeline.
pub async fn sample_timeline(tools: &ToolRegistry, path: &Path) -> PacketTimeline {
    match try_sample_timeline(tools, path).await {
        Ok(timeline) => timeline,
        Err(e) => {
            tracing::warn!("packet timeline unavailable for {}: {e}", path.display());
            PacketTimeline::default()
        }
    }
}

async fn try_sample_timeline(tools: &ToolRegistry, path: &Path) -> Result<PacketTimeline> {
    let mut timestamps = PacketTimestamps::open(tools, path)?;
    let tool = timestamps.lines.tool().to_string();

    match timestamps.lines.timeout() {
        Some(limit) => match tokio::time::timeout(limit, fold(&mut timestamps)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                timestamps.lines.abort().await;
                Err(Error::Timeout { tool, after: limit })
            }
        },
        None => fold(&mut timestamps).await,
    }
}

async fn fold(timestamps: &mut PacketTimestamps) -> Result<PacketTimeline> {
    let mut timeline = PacketTimeline::default();
    let mut packets: u64 = 0;
    while let Some(pts) = timestamps.next_pts().await? {
        timeline.observe(pts);
        packets += 1;
    }
    tracing::debug!(packets, ?timeline, "packet scan complete");
    Ok(timeline)
}

/// Lazy sequence of packet timestamps from one ffprobe invocation.
///
/// Each call to [`PacketTimestamps::open`] starts a fresh scan.
#[derive(Debug)]
pub struct PacketTimestamps {
    lines: ToolLines,
}

impl PacketTimestamps {
    /// Spawn the packet lister for `path`.
    pub fn open(tools: &ToolRegistry, path: &Path) -> Result<Self> {
        let mut cmd = tools.command("ffprobe")?;
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_packets",
            "-show_entries",
            "packet=pts_time",
            "-of",
            "csv=p=0",
            "-read_intervals",
            READ_ALL_PACKETS,
        ]);
        cmd.args(ANALYZE_BOUNDS.iter().copied());
        cmd.path_arg(path);

        Ok(Self {
            lines: cmd.spawn_lines()?,
        })
    }

    /// Next parseable timestamp, skipping blank, placeholder and undecodable
    /// lines.
    pub async fn next_pts(&mut self) -> Result<Option<f64>> {
        while let Some(line) = self.lines.next_line().await? {
            if let Some(pts) = parse_pts_line(&line) {
                return Ok(Some(pts));
            }
        }
        Ok(None)
    }
}

/// Parse one packet-lister line, `None` for blanks and tokens like `N/A`.
pub fn parse_pts_line(line: &str) -> Option<f64> {
    let line = line.trim().trim_end_matches(',');
    if line.is_empty() {
        return None;
    }
    line.parse::<f64>().ok().filter(|v| v.is_finite())
}
