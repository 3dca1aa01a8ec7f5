use clap::Parser;
use std::path::PathBuf;
use vidmend::config::Config;

#[derive(Parser, Debug)]
#[command(name = "vidmend")]
#[command(
    author,
    version,
    about = "Audit and repair video files with a broken timeline (DVR/CCTV). Lossless fixes are tried before a CFR re-encode."
)]
pub struct Cli {
    /// File or directory to process
    #[arg(required_unless_present = "check_tools")]
    pub input: Option<PathBuf>,

    /// Write a report to this path (`;`-separated CSV, or JSON if it ends in .json)
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Tolerated relative divergence between metadata and packet durations [default: 0.20]
    #[arg(long, value_name = "RATIO")]
    pub tol: Option<f64>,

    /// Frame rate to try for raw streams and re-encodes; repeat for several [default: 25 30]
    #[arg(long = "fps", value_name = "FPS")]
    pub fps: Vec<u32>,

    /// Only audit and report what would be done; modify nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Replace the original file (keeping a .bak) instead of writing next to it
    #[arg(long)]
    pub inplace: bool,

    /// Produce MKV where the repair allows a choice of container
    #[arg(long)]
    pub prefer_mkv: bool,

    /// Number of files processed concurrently [default: 1]
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Check that ffmpeg and ffprobe are available, then exit
    #[arg(long)]
    pub check_tools: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(tol) = self.tol {
            config.diagnosis.tolerance = tol;
        }
        if !self.fps.is_empty() {
            config.repair.frame_rates = self.fps.clone();
        }
        if self.inplace {
            config.repair.in_place = true;
        }
        if self.prefer_mkv {
            config.repair.prefer_mkv = true;
        }
        if let Some(jobs) = self.jobs {
            config.scan.jobs = jobs;
        }
    }
}
