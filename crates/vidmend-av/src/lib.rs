//! # vidmend-av
//!
//! Everything in vidmend that touches ffmpeg, ffprobe or the filesystem.
//!
//! - **Tool discovery** ([`ToolRegistry`]): locate ffmpeg and ffprobe, from
//!   config overrides or `PATH`.
//! - **Command execution** ([`ToolCommand`]): async builder with timeout,
//!   either capturing output or streaming it line by line.
//! - **Probing** ([`probe`]): container metadata and the packet timeline.
//! - **Repair** ([`repair`]): the ordered strategy chains for WRAP and FIX.
//! - **Replacement** ([`replace`]): side-by-side output or in-place promotion
//!   with a `.bak` of the original.

pub mod command;
pub mod probe;
pub mod repair;
pub mod replace;
pub mod tools;

#[cfg(all(test, unix))]
mod testutil;

pub use command::{ToolCommand, ToolLines, ToolOutput};
pub use probe::{probe_metadata, sample_timeline};
pub use repair::{RepairChain, RepairOutcome, RepairStrategy};
pub use replace::Placement;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
