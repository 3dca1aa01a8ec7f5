//! Shared fixtures for integration tests.
//!
//! ffmpeg and ffprobe are replaced by small shell scripts. The fake ffprobe
//! answers from sidecar files next to the media: `<file>.json` for the
//! metadata probe and `<file>.pts` for the packet listing. The fake ffmpeg
//! writes a small file to its last argument (the output path) and can be
//! told to fail unless its arguments contain a given flag.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use vidmend_av::{ToolConfig, ToolRegistry};

pub const FAKE_FFPROBE: &str = r#"case "$1" in -version) echo "ffprobe version fake"; exit 0 ;; esac
for last; do :; done
case " $* " in
  *" -show_packets "*) [ -f "$last.pts" ] && cat "$last.pts"; exit 0 ;;
esac
[ -f "$last.json" ] || exit 1
cat "$last.json""#;

/// Fake ffmpeg that always succeeds.
pub const FAKE_FFMPEG: &str = r#"case "$1" in -version) echo "ffmpeg version fake"; exit 0 ;; esac
for last; do :; done
printf 'repaired' > "$last""#;

/// Fake ffmpeg that only succeeds when its arguments contain `needle`.
pub fn ffmpeg_succeeding_on(needle: &str) -> String {
    format!(
        r#"for last; do :; done
case " $* " in
  *" {needle} "*) printf 'repaired' > "$last"; exit 0 ;;
esac
exit 1"#
    )
}

pub struct FakeTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl FakeTools {
    /// Install both scripts into `dir`.
    pub fn install(dir: &Path, ffmpeg_body: &str) -> Self {
        Self {
            ffmpeg: write_script(dir, "ffmpeg", ffmpeg_body),
            ffprobe: write_script(dir, "ffprobe", FAKE_FFPROBE),
        }
    }

    pub fn registry(&self) -> ToolRegistry {
        ToolRegistry::from_configs([
            ToolConfig {
                name: "ffmpeg".into(),
                path: self.ffmpeg.clone(),
                timeout: None,
            },
            ToolConfig {
                name: "ffprobe".into(),
                path: self.ffprobe.clone(),
                timeout: None,
            },
        ])
    }

    /// A config file pointing vidmend at these scripts.
    pub fn write_config(&self, dir: &Path, extra: &str) -> PathBuf {
        let path = dir.join("vidmend.toml");
        fs::write(
            &path,
            format!(
                "[tools]\nffmpeg_path = {:?}\nffprobe_path = {:?}\n{extra}",
                self.ffmpeg.display().to_string(),
                self.ffprobe.display().to_string()
            ),
        )
        .unwrap();
        path
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write a container file with inspector and packet sidecars.
pub fn media(dir: &Path, name: &str, format_name: &str, duration: f64, codec: &str, pts: &[f64]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"media").unwrap();
    fs::write(
        dir.join(format!("{name}.json")),
        format!(
            r#"{{"format": {{"format_name": "{format_name}", "duration": "{duration:.6}", "start_time": "0.000000"}},
                "streams": [{{"codec_type": "video", "codec_name": "{codec}"}}]}}"#
        ),
    )
    .unwrap();
    let lines: Vec<String> = pts.iter().map(|p| format!("{p:.6}")).collect();
    fs::write(dir.join(format!("{name}.pts")), lines.join("\n") + "\n").unwrap();
    path
}

/// A coherent MP4: 10 s declared, 10.1 s of packets.
pub fn coherent_mp4(dir: &Path, name: &str) -> PathBuf {
    media(dir, name, "mov,mp4,m4a,3gp,3g2,mj2", 10.0, "h264", &[0.0, 5.0, 10.1])
}

/// A file whose packets run 25% past the declared duration.
pub fn divergent(dir: &Path, name: &str) -> PathBuf {
    media(dir, name, "matroska,webm", 10.0, "vp9", &[0.0, 6.0, 12.5])
}

/// A raw elementary stream.
pub fn raw(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"\x00\x00\x00\x01raw").unwrap();
    path
}

/// File names directly inside `dir`, sorted.
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
