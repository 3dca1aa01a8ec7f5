//! Fake ffmpeg/ffprobe scripts for unit tests.

use std::path::{Path, PathBuf};

use crate::tools::{ToolConfig, ToolRegistry};

/// ffprobe stand-in: answers from `<input>.json` and `<input>.pts` sidecars.
pub const FAKE_FFPROBE: &str = r#"for last; do :; done
case " $* " in
  *" -show_packets "*) [ -f "$last.pts" ] && cat "$last.pts"; exit 0 ;;
esac
[ -f "$last.json" ] || exit 1
cat "$last.json""#;

/// ffmpeg stand-in that always writes a non-empty output file.
pub const FAKE_FFMPEG_OK: &str = r#"for last; do :; done
printf 'repaired' > "$last""#;

/// Write an executable `/bin/sh` script.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A registry whose ffmpeg and ffprobe are the given script bodies.
pub fn registry(dir: &Path, ffmpeg_body: &str, ffprobe_body: &str) -> ToolRegistry {
    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    ToolRegistry::from_configs([
        ToolConfig {
            name: "ffmpeg".into(),
            path: write_script(&bin, "ffmpeg", ffmpeg_body),
            timeout: None,
        },
        ToolConfig {
            name: "ffprobe".into(),
            path: write_script(&bin, "ffprobe", ffprobe_body),
            timeout: None,
        },
    ])
}

/// Body of an ffmpeg stand-in that logs each invocation to `log` and only
/// succeeds when its arguments contain `needle`. Failing runs leave a partial
/// file behind, as a crashed muxer would.
pub fn ffmpeg_succeeding_on(log: &Path, needle: &str) -> String {
    format!(
        r#"echo "$*" >> '{log}'
for last; do :; done
case " $* " in
  *" {needle} "*) printf 'repaired' > "$last"; exit 0 ;;
esac
printf 'partial' > "$last"
exit 1"#,
        log = log.display()
    )
}
