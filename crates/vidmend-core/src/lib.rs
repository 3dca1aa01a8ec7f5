//! vidmend-core: shared types, errors, configuration and the verdict engine.
//!
//! This crate is the foundational dependency for the other vidmend crates. It
//! performs no I/O: the verdict engine in [`verdict`] is a pure function of a
//! [`FileTarget`], its [`MediaProbe`] and its [`PacketTimeline`].

pub mod config;
pub mod error;
pub mod media;
pub mod verdict;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, Result};
pub use media::*;
pub use verdict::{diagnose, Diagnosis, Diagnostics, Verdict, DEFAULT_TOLERANCE};
