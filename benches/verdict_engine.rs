//! Benchmarks for the verdict engine and timeline folding
//!
//! The verdict itself is cheap; folding millions of packet timestamps is the
//! hot path on long recordings.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vidmend_core::{diagnose, FileTarget, MediaProbe, PacketTimeline};

fn probe(duration: f64, container: &str, codec: &str) -> MediaProbe {
    MediaProbe {
        duration: Some(duration),
        container: Some(container.to_string()),
        video_codec: Some(codec.to_string()),
        start_time: Some(0.0),
    }
}

fn bench_diagnose(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnose");

    let mp4 = FileTarget::new("/dvr/cam1.mp4");
    let raw = FileTarget::new("/dvr/cam1.h264");
    let coherent = probe(600.0, "mov,mp4,m4a,3gp,3g2,mj2", "h264");
    let combo = probe(600.0, "mpegts", "hevc");
    let agreeing = PacketTimeline::new(Some(0.0), Some(600.4));
    let drifting = PacketTimeline::new(Some(0.0), Some(912.0));

    group.bench_function("ok", |b| {
        b.iter(|| diagnose(black_box(&mp4), black_box(&coherent), black_box(&agreeing), 0.20))
    });
    group.bench_function("fix_divergence", |b| {
        b.iter(|| diagnose(black_box(&mp4), black_box(&coherent), black_box(&drifting), 0.20))
    });
    group.bench_function("fix_combo", |b| {
        b.iter(|| diagnose(black_box(&mp4), black_box(&combo), black_box(&agreeing), 0.20))
    });
    group.bench_function("wrap_raw", |b| {
        b.iter(|| {
            diagnose(
                black_box(&raw),
                black_box(&MediaProbe::unavailable()),
                black_box(&PacketTimeline::default()),
                0.20,
            )
        })
    });

    group.finish();
}

fn bench_timeline_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_fold");

    // 25 fps: one hour is 90k packets, a day is 2.16M.
    for packets in [90_000u64, 2_160_000] {
        let timestamps: Vec<f64> = (0..packets).map(|i| i as f64 * 0.04).collect();
        group.throughput(Throughput::Elements(packets));
        group.bench_with_input(
            BenchmarkId::from_parameter(packets),
            &timestamps,
            |b, timestamps| {
                b.iter(|| PacketTimeline::from_timestamps(black_box(timestamps).iter().copied()))
            },
        );
    }

    group.finish();
}

fn bench_parse_pts(c: &mut Criterion) {
    let lines: Vec<String> = (0..10_000)
        .map(|i| {
            if i % 500 == 0 {
                "N/A".to_string()
            } else {
                format!("{:.6}", i as f64 * 0.04)
            }
        })
        .collect();

    let mut group = c.benchmark_group("parse_pts");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("10k_lines", |b| {
        b.iter(|| {
            PacketTimeline::from_timestamps(
                lines
                    .iter()
                    .filter_map(|l| vidmend_av::probe::parse_pts_line(black_box(l))),
            )
        })
    });
    group.finish();
}

/// Inspector output for a typical DVR export.
const FFPROBE_DVR: &str = r#"{
    "format": {
        "filename": "/dvr/cam1.mp4",
        "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
        "duration": "3600.040000",
        "start_time": "0.000000"
    },
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "duration": "3600.000000"},
        {"index": 1, "codec_type": "audio", "codec_name": "pcm_alaw", "duration": "3600.040000"}
    ]
}"#;

fn bench_parse_probe(c: &mut Criterion) {
    c.bench_function("parse_ffprobe_json/dvr", |b| {
        b.iter(|| vidmend_av::probe::parse_ffprobe_json(black_box(FFPROBE_DVR)))
    });
}

criterion_group!(
    benches,
    bench_diagnose,
    bench_timeline_fold,
    bench_parse_pts,
    bench_parse_probe
);
criterion_main!(benches);
