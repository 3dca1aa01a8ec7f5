//! MP4 stream copy with a fixed track timescale and front-loaded index.

use std::path::Path;

use super::{RepairStrategy, StrategyFamily};
use crate::command::ToolCommand;

/// 90 kHz, the MPEG system clock.
const VIDEO_TRACK_TIMESCALE: &str = "90000";

#[derive(Debug, Clone, Copy, Default)]
pub struct FaststartCopy;

impl RepairStrategy for FaststartCopy {
    fn tag(&self) -> String {
        "mp4_faststart_timescale".to_string()
    }

    fn family(&self) -> StrategyFamily {
        StrategyFamily::Faststart
    }

    fn output_extension(&self) -> &'static str {
        "mp4"
    }

    fn configure(&self, cmd: &mut ToolCommand, input: &Path, output: &Path) {
        cmd.arg("-i");
        cmd.path_arg(input);
        cmd.args([
            "-c",
            "copy",
            "-movflags",
            "+faststart",
            "-video_track_timescale",
            VIDEO_TRACK_TIMESCALE,
        ]);
        cmd.path_arg(output);
    }
}
