//! Per-file result rows, the console audit trail and the report file.

use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use vidmend_av::RepairOutcome;
use vidmend_core::{Diagnosis, Diagnostics, Verdict};

/// Action recorded for files that need nothing.
pub const ACTION_NONE: &str = "none";
/// Action recorded for files that would be repaired outside a dry run.
pub const ACTION_PLANNED: &str = "planned";

const CSV_HEADER: [&str; 6] = ["path", "verdict", "reason", "action", "output", "error"];

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub verdict: Verdict,
    pub reason: String,
    pub action: String,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
    pub diagnostics: Diagnostics,
}

impl FileReport {
    /// A row for a diagnosed file with no action taken yet.
    pub fn new(path: &Path, diagnosis: Diagnosis) -> Self {
        Self {
            path: path.to_path_buf(),
            verdict: diagnosis.verdict,
            reason: diagnosis.reason,
            action: ACTION_NONE.to_string(),
            output: None,
            error: None,
            diagnostics: diagnosis.diagnostics,
        }
    }

    /// Record what the repair chain did.
    pub fn record_repair(&mut self, outcome: RepairOutcome) {
        self.action = outcome.strategy_tag;
        self.output = outcome.output_path;
        self.error = outcome.error_detail;
    }

    /// Whether a repair was attempted and did not succeed.
    pub fn repair_failed(&self) -> bool {
        self.error.is_some()
    }

    fn attempted_repair(&self) -> bool {
        self.action != ACTION_NONE && self.action != ACTION_PLANNED
    }

    /// Console lines for this file, newline-terminated.
    pub fn audit_text(&self) -> String {
        let mut text = format!(
            "[AUDIT:{}] {} -> {}\n",
            self.verdict,
            self.path.display(),
            self.reason
        );
        if self.attempted_repair() {
            if let Some(error) = &self.error {
                let _ = writeln!(text, "  -> [ERROR] {}: {error}", self.action);
            } else {
                let output = self
                    .output
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let _ = writeln!(text, "  -> [OK] action: {}  output: {output}", self.action);
            }
        }
        text
    }

    fn csv_fields(&self) -> [String; 6] {
        [
            self.path.display().to_string(),
            self.verdict.to_string(),
            self.reason.clone(),
            self.action.clone(),
            self.output
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// Per-verdict counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "OK")]
    pub ok: usize,
    #[serde(rename = "WRAP")]
    pub wrap: usize,
    #[serde(rename = "FIX")]
    pub fix: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.verdict {
                Verdict::Ok => summary.ok += 1,
                Verdict::Wrap => summary.wrap += 1,
                Verdict::Fix => summary.fix += 1,
            }
        }
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OK={} WRAP={} FIX={}", self.ok, self.wrap, self.fix)
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    rows: &'a [FileReport],
    summary: Summary,
}

/// Write the report: JSON when `path` ends in `.json`, otherwise `;`-separated CSV.
pub fn write_report(path: &Path, reports: &[FileReport]) -> Result<()> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let content = if is_json {
        let document = ReportDocument {
            generated_at: Utc::now(),
            rows: reports,
            summary: Summary::from_reports(reports),
        };
        serde_json::to_string_pretty(&document)?
    } else {
        render_csv(reports)
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Render rows as `;`-separated CSV with a header line.
pub fn render_csv(reports: &[FileReport]) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, CSV_HEADER.iter().copied());
    for report in reports {
        push_csv_row(&mut out, report.csv_fields().iter().map(String::as_str));
    }
    out
}

fn push_csv_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(';');
        }
        if field.contains([';', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
