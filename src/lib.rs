//! vidmend - audit and repair video files whose container metadata disagrees
//! with their packet timeline.
//!
//! This library crate exposes the orchestration layer for the binary and for
//! integration testing. The verdict engine lives in `vidmend-core`; everything
//! that runs ffmpeg or ffprobe lives in `vidmend-av`.

pub mod config;
pub mod processor;
pub mod report;
pub mod scan;
