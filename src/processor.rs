//! Per-file pipeline and batch driver.
//!
//! Each file goes through probe, packet sampling, verdict and (when needed
//! and not a dry run) the repair chain, strictly in that order. Files are
//! independent; up to `jobs` of them are in flight at once. Files sharing a
//! directory and stem could collide on output names (`cam.h264` and `cam.ts`
//! both promote to `cam.mp4`) so they run one after another in a single lane.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use vidmend_av::{probe_metadata, sample_timeline, Placement, RepairChain, ToolRegistry};
use vidmend_core::config::{Config, RepairConfig};
use vidmend_core::{diagnose, Diagnosis, FileTarget, MediaProbe, PacketTimeline};

use crate::report::{FileReport, ACTION_PLANNED};

/// Settings resolved from config and command line for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tolerance: f64,
    pub repair: RepairConfig,
    pub dry_run: bool,
    pub jobs: usize,
}

impl RunOptions {
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self {
            tolerance: config.diagnosis.tolerance,
            repair: config.repair.clone(),
            dry_run,
            jobs: config.scan.jobs.max(1),
        }
    }

    fn placement(&self) -> Placement {
        Placement::from_in_place(self.repair.in_place)
    }
}

/// Drives diagnosis and repair over a set of targets.
pub struct Processor {
    tools: ToolRegistry,
    options: RunOptions,
}

impl Processor {
    pub fn new(tools: ToolRegistry, options: RunOptions) -> Self {
        Self { tools, options }
    }

    /// Diagnose one file. Raw bitstreams are not probed at all.
    pub async fn diagnose(&self, target: &FileTarget) -> Diagnosis {
        let (probe, timeline) = if target.is_raw_bitstream() {
            (MediaProbe::unavailable(), PacketTimeline::default())
        } else {
            let probe = probe_metadata(&self.tools, target.path()).await;
            let timeline = sample_timeline(&self.tools, target.path()).await;
            (probe, timeline)
        };
        diagnose(target, &probe, &timeline, self.options.tolerance)
    }

    /// Diagnose one file and repair it if needed.
    pub async fn process(&self, target: &FileTarget) -> FileReport {
        let diagnosis = self.diagnose(target).await;
        tracing::debug!(verdict = %diagnosis.verdict, diagnostics = ?diagnosis.diagnostics, "{}", target.path().display());

        let mut report = FileReport::new(target.path(), diagnosis);
        if !report.verdict.needs_repair() {
            return report;
        }
        if self.options.dry_run {
            report.action = ACTION_PLANNED.to_string();
            return report;
        }

        if let Some(chain) = RepairChain::for_verdict(report.verdict, &self.options.repair) {
            let outcome = chain
                .run(&self.tools, target.path(), self.options.placement())
                .await;
            report.record_repair(outcome);
        }
        report
    }

    /// Process every target, calling `on_report` as each one finishes.
    ///
    /// The returned rows are in the same order as `targets`.
    pub async fn run<F>(&self, targets: Vec<FileTarget>, on_report: F) -> Vec<FileReport>
    where
        F: Fn(&FileReport),
    {
        let on_report = &on_report;

        let finished = stream::iter(lanes(targets))
            .map(|lane| async move {
                let mut done = Vec::with_capacity(lane.len());
                for (index, target) in lane {
                    let report = self.process(&target).await;
                    on_report(&report);
                    done.push((index, report));
                }
                done
            })
            .buffer_unordered(self.options.jobs.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut rows: Vec<(usize, FileReport)> = finished.into_iter().flatten().collect();
        rows.sort_by_key(|(index, _)| *index);
        rows.into_iter().map(|(_, report)| report).collect()
    }
}

/// Group targets by directory and stem, keeping input indices. Lanes are
/// ordered by their first member.
fn lanes(targets: Vec<FileTarget>) -> Vec<Vec<(usize, FileTarget)>> {
    let mut by_key: HashMap<(Option<PathBuf>, Option<OsString>), usize> = HashMap::new();
    let mut lanes: Vec<Vec<(usize, FileTarget)>> = Vec::new();

    for (index, target) in targets.into_iter().enumerate() {
        let key = (
            target.path().parent().map(|p| p.to_path_buf()),
            target.path().file_stem().map(|s| s.to_os_string()),
        );
        let lane = *by_key.entry(key).or_insert_with(|| {
            lanes.push(Vec::new());
            lanes.len() - 1
        });
        lanes[lane].push((index, target));
    }
    lanes
}
