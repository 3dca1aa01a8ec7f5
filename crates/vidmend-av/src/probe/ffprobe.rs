//! Metadata probe backed by `ffprobe -show_format -show_streams`.
//!
//! Failures are not surfaced: a non-zero exit, a timeout or unparseable JSON
//! all produce [`MediaProbe::unavailable`].

use std::path::Path;

use serde::Deserialize;
use vidmend_core::{Error, MediaProbe, Result};

use super::ANALYZE_BOUNDS;
use crate::tools::ToolRegistry;

/// Probe container-level metadata for `path`.
pub async fn probe_metadata(tools: &ToolRegistry, path: &Path) -> MediaProbe {
    match try_probe_metadata(tools, path).await {
        Ok(probe) => probe,
        Err(e) => {
            tracing::warn!("metadata probe unavailable for {}: {e}", path.display());
            MediaProbe::unavailable()
        }
    }
}

async fn try_probe_metadata(tools: &ToolRegistry, path: &Path) -> Result<MediaProbe> {
    let mut cmd = tools.command("ffprobe")?;
    cmd.args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"]);
    cmd.args(ANALYZE_BOUNDS.iter().copied());
    cmd.path_arg(path);

    let output = cmd.execute().await?;
    let probe = parse_ffprobe_json(&output.stdout)?;
    tracing::debug!(?probe, "probed {}", path.display());
    Ok(probe)
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Option<Vec<FfprobeStream>>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Interpret ffprobe's JSON output.
///
/// Duration prefers the container value and otherwise falls back to the
/// longest positive stream duration. When several video streams exist the
/// last one's codec is reported.
pub fn parse_ffprobe_json(json: &str) -> Result<MediaProbe> {
    let output: FfprobeOutput = serde_json::from_str(if json.trim().is_empty() {
        "{}"
    } else {
        json
    })
    .map_err(|e| Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    let format = output.format.unwrap_or_default();
    let streams = output.streams.unwrap_or_default();

    let mut duration = parse_seconds(format.duration.as_deref());
    let mut video_codec = None;

    for stream in &streams {
        if stream.codec_type.as_deref() == Some("video") {
            video_codec = stream.codec_name.clone();
        }
    }

    if duration.is_none() {
        duration = streams
            .iter()
            .filter_map(|s| parse_seconds(s.duration.as_deref()))
            .filter(|&d| d > 0.0)
            .reduce(f64::max);
    }

    Ok(MediaProbe {
        duration,
        container: format.format_name,
        video_codec,
        start_time: parse_seconds(format.start_time.as_deref()),
    })
}

/// Parse a decimal seconds value; anything non-numeric (e.g. `"N/A"`) is `None`.
fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_container_duration_and_codec() {
        let json = r#"{
            "format": {
                "filename": "/dvr/cam1.mp4",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "600.040000",
                "start_time": "0.000000"
            },
            "streams": [
                {"index": 0, "codec_type": "video", "codec_name": "h264", "duration": "600.000000"},
                {"index": 1, "codec_type": "audio", "codec_name": "aac", "duration": "600.040000"}
            ]
        }"#;
        let probe = parse_ffprobe_json(json).unwrap();
        assert_eq!(probe.duration, Some(600.04));
        assert_eq!(probe.container.as_deref(), Some("mov,mp4,m4a,3gp,3g2,mj2"));
        assert_eq!(probe.video_codec.as_deref(), Some("h264"));
        assert_eq!(probe.start_time, Some(0.0));
    }

    #[test]
    fn falls_back_to_longest_stream_duration() {
        let json = r#"{
            "format": {"format_name": "avi"},
            "streams": [
                {"codec_type": "video", "codec_name": "mpeg4", "duration": "12.5"},
                {"codec_type": "audio", "codec_name": "mp3", "duration": "13.25"},
                {"codec_type": "data", "duration": "-4"}
            ]
        }"#;
        let probe = parse_ffprobe_json(json).unwrap();
        assert_eq!(probe.duration, Some(13.25));
        assert_eq!(probe.start_time, None);
    }

    #[test]
    fn non_positive_stream_durations_are_ignored() {
        let json = r#"{
            "format": {"format_name": "h264"},
            "streams": [{"codec_type": "video", "codec_name": "h264", "duration": "0"}]
        }"#;
        assert_eq!(parse_ffprobe_json(json).unwrap().duration, None);
    }

    #[test]
    fn last_video_stream_codec_wins() {
        let json = r#"{
            "format": {"format_name": "mpegts", "duration": "30"},
            "streams": [
                {"codec_type": "video", "codec_name": "h264"},
                {"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "codec_name": "hevc"}
            ]
        }"#;
        assert_eq!(
            parse_ffprobe_json(json).unwrap().video_codec.as_deref(),
            Some("hevc")
        );
    }

    #[test]
    fn unparseable_numbers_become_null() {
        let json = r#"{
            "format": {"format_name": "mpegts", "duration": "N/A", "start_time": "garbage"},
            "streams": []
        }"#;
        let probe = parse_ffprobe_json(json).unwrap();
        assert_eq!(probe.duration, None);
        assert_eq!(probe.start_time, None);
        assert_eq!(probe.container.as_deref(), Some("mpegts"));
    }

    #[test]
    fn empty_output_is_an_empty_probe() {
        assert_eq!(parse_ffprobe_json("").unwrap(), MediaProbe::unavailable());
        assert_eq!(parse_ffprobe_json("{}").unwrap(), MediaProbe::unavailable());
    }

    #[test]
    fn invalid_json_is_a_probe_error() {
        assert!(matches!(
            parse_ffprobe_json("not json"),
            Err(Error::Probe(_))
        ));
    }

    #[test]
    fn parse_seconds_forms() {
        assert_eq!(parse_seconds(Some(" 1.5 ")), Some(1.5));
        assert_eq!(parse_seconds(Some("nan")), None);
        assert_eq!(parse_seconds(Some("")), None);
        assert_eq!(parse_seconds(None), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_inspector_yields_unavailable_probe() {
        let dir = tempfile::tempdir().unwrap();
        let tools = crate::testutil::registry(dir.path(), "exit 1", "exit 1");
        let probe = probe_metadata(&tools, &dir.path().join("cam.mp4")).await;
        assert_eq!(probe, MediaProbe::unavailable());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn probes_through_inspector() {
        let dir = tempfile::tempdir().unwrap();
        let tools = crate::testutil::registry(dir.path(), "exit 1", crate::testutil::FAKE_FFPROBE);
        let media = dir.path().join("cam.mp4");
        std::fs::write(
            dir.path().join("cam.mp4.json"),
            r#"{"format": {"format_name": "mpegts", "duration": "8.0"}, "streams": []}"#,
        )
        .unwrap();
        let probe = probe_metadata(&tools, &media).await;
        assert_eq!(probe.duration, Some(8.0));
        assert_eq!(probe.container.as_deref(), Some("mpegts"));
    }
}
