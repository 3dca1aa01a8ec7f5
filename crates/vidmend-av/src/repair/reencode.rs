//! Constant-frame-rate re-encode, the last resort.

use std::path::Path;

use vidmend_core::config::RepairConfig;

use super::{preferred_extension, RepairStrategy, StrategyFamily};
use crate::command::ToolCommand;

/// Encoder parameters taken from the `[repair]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub prefer_mkv: bool,
}

impl From<&RepairConfig> for EncodeSettings {
    fn from(cfg: &RepairConfig) -> Self {
        Self {
            video_codec: cfg.video_codec.clone(),
            preset: cfg.preset.clone(),
            crf: cfg.crf,
            audio_codec: cfg.audio_codec.clone(),
            audio_bitrate: cfg.audio_bitrate.clone(),
            prefer_mkv: cfg.prefer_mkv,
        }
    }
}

/// Re-encode the first video and audio stream with timestamps rebased to zero
/// and uniform frame spacing. `fps` hints the input frame rate; `None` lets
/// ffmpeg infer it.
#[derive(Debug, Clone)]
pub struct Reencode {
    fps: Option<u32>,
    settings: EncodeSettings,
}

impl Reencode {
    pub fn new(fps: Option<u32>, settings: EncodeSettings) -> Self {
        Self { fps, settings }
    }
}

impl RepairStrategy for Reencode {
    fn tag(&self) -> String {
        match self.fps {
            Some(fps) => format!("reencode_cfr({fps})"),
            None => "reencode_cfr(auto)".to_string(),
        }
    }

    fn family(&self) -> StrategyFamily {
        StrategyFamily::Reencode
    }

    fn output_extension(&self) -> &'static str {
        preferred_extension(self.settings.prefer_mkv)
    }

    fn configure(&self, cmd: &mut ToolCommand, input: &Path, output: &Path) {
        let s = &self.settings;
        if let Some(fps) = self.fps {
            cmd.arg("-framerate").arg(fps.to_string());
        }
        cmd.arg("-i");
        cmd.path_arg(input);
        cmd.args([
            "-map",
            "0:v:0?",
            "-map",
            "0:a:0?",
            "-vf",
            "setpts=PTS-STARTPTS",
            "-fps_mode",
            "cfr",
        ]);
        cmd.arg("-c:v").arg(s.video_codec.as_str());
        cmd.arg("-preset").arg(s.preset.as_str());
        cmd.arg("-crf").arg(s.crf.to_string());
        cmd.args(["-pix_fmt", "yuv420p"]);
        cmd.arg("-c:a").arg(s.audio_codec.as_str());
        cmd.arg("-b:a").arg(s.audio_bitrate.as_str());
        if !s.prefer_mkv {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.path_arg(output);
    }
}
