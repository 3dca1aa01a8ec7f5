//! Wrap a raw elementary stream into a container at a given frame rate.

use std::path::Path;

use super::{preferred_extension, RepairStrategy, StrategyFamily};
use crate::command::ToolCommand;

/// Stream-copy a raw bitstream into MP4/MKV, stamping `fps` on the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrap {
    fps: u32,
    prefer_mkv: bool,
}

impl Wrap {
    pub fn new(fps: u32, prefer_mkv: bool) -> Self {
        Self { fps, prefer_mkv }
    }
}

impl RepairStrategy for Wrap {
    fn tag(&self) -> String {
        format!("wrap({})", self.fps)
    }

    fn family(&self) -> StrategyFamily {
        StrategyFamily::Wrap
    }

    fn output_extension(&self) -> &'static str {
        preferred_extension(self.prefer_mkv)
    }

    fn output_suffix(&self) -> String {
        format!("_wrapped{}", self.fps)
    }

    fn configure(&self, cmd: &mut ToolCommand, input: &Path, output: &Path) {
        cmd.arg("-framerate").arg(self.fps.to_string()).arg("-i");
        cmd.path_arg(input);
        cmd.args(["-c", "copy"]);
        cmd.path_arg(output);
    }
}
