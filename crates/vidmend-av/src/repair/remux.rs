//! Lossless remux into Matroska.

use std::path::Path;

use super::{RepairStrategy, StrategyFamily};
use crate::command::ToolCommand;
use crate::probe::ANALYZE_BOUNDS;

/// Copy every stream into MKV with regenerated timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Remux;

impl RepairStrategy for Remux {
    fn tag(&self) -> String {
        "remux_mkv".to_string()
    }

    fn family(&self) -> StrategyFamily {
        StrategyFamily::Remux
    }

    fn output_extension(&self) -> &'static str {
        "mkv"
    }

    fn configure(&self, cmd: &mut ToolCommand, input: &Path, output: &Path) {
        cmd.args(ANALYZE_BOUNDS.iter().copied());
        cmd.arg("-i");
        cmd.path_arg(input);
        cmd.args(["-c", "copy"]);
        cmd.path_arg(output);
    }
}
