// src/report.rs
//
// Validation reports and the sinks that persist them.
//
// The harness produces a SuiteReport and hands it to a ReportSink. Sinks are
// the only code in the crate that touches the filesystem or stdout.
//
// JSON field names: timestamp, suite_id, total_tests, passed, results[]
// with test, model, ground_truth, estimated, error, tolerance, passed,
// verdict, model_error, samples, conversions, dataset_checksum.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::credit::CreditDistribution;
use crate::error::{BenchError, Result};

// =============================================================================
// Data Structures
// =============================================================================

/// Outcome of one (scenario, model) evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Error within tolerance.
    Pass,
    /// Error above tolerance.
    Fail,
    /// The model errored or panicked; no error metric was computed.
    ModelError,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::ModelError => "MODEL ERROR",
        }
    }
}

/// One row of a suite report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Scenario name.
    #[serde(rename = "test")]
    pub scenario: String,
    /// Model name.
    pub model: String,
    /// Ground truth as stated by the scenario.
    pub ground_truth: CreditDistribution,
    /// Normalized model output (empty on model error).
    pub estimated: CreditDistribution,
    /// L1 distance between normalized ground truth and estimate.
    pub error: f64,
    /// Threshold the error was judged against.
    pub tolerance: f64,
    pub passed: bool,
    pub verdict: Verdict,
    /// Failure message when `verdict` is `ModelError`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
    /// Number of records in the scenario dataset.
    pub samples: usize,
    /// Number of converted records.
    pub conversions: usize,
    /// SHA-256 of the scenario dataset.
    pub dataset_checksum: String,
}

/// Result of a harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Suite identifier.
    pub suite_id: String,
    pub total_tests: usize,
    pub passed: usize,
    /// Entries in scenario-then-model order.
    pub results: Vec<ReportEntry>,
}

impl SuiteReport {
    pub fn new(suite_id: impl Into<String>, results: Vec<ReportEntry>) -> Self {
        Self::with_timestamp(suite_id, results, Utc::now())
    }

    pub fn with_timestamp(
        suite_id: impl Into<String>,
        results: Vec<ReportEntry>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let passed = results.iter().filter(|e| e.passed).count();
        Self {
            timestamp,
            suite_id: suite_id.into(),
            total_tests: results.len(),
            passed,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total_tests
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> + '_ {
        self.results.iter().filter(|e| !e.passed)
    }

    /// Default file name: `causal_report_YYYYmmdd_HHMMSS.json`.
    pub fn file_name(&self) -> String {
        format!(
            "causal_report_{}.json",
            self.timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}

// =============================================================================
// Output Writers
// =============================================================================

/// Write the JSON report to a file, creating parent directories.
pub fn write_json_report(report: &SuiteReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BenchError::io(parent.display().to_string(), e))?;
    }
    let file = File::create(path).map_err(|e| BenchError::io(path.display().to_string(), e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Write the Markdown report to a file, creating parent directories.
pub fn write_markdown_report(report: &SuiteReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BenchError::io(parent.display().to_string(), e))?;
    }
    let file = File::create(path).map_err(|e| BenchError::io(path.display().to_string(), e))?;
    let mut writer = BufWriter::new(file);
    render_markdown(report, &mut writer).map_err(|e| BenchError::io(path.display().to_string(), e))
}

fn render_markdown<W: Write>(report: &SuiteReport, w: &mut W) -> std::io::Result<()> {
    writeln!(w, "# Causal Integrity Report: {}", report.suite_id)?;
    writeln!(w)?;
    writeln!(w, "**Generated:** {}", report.timestamp.to_rfc3339())?;
    writeln!(w)?;
    if report.all_passed() {
        writeln!(w, "## ✓ All Tests Passed")?;
    } else {
        writeln!(w, "## ✗ Some Tests Failed")?;
    }
    writeln!(w)?;
    writeln!(w, "| Scenario | Model | Error | Tolerance | Verdict |")?;
    writeln!(w, "|----------|-------|-------|-----------|---------|")?;
    for e in &report.results {
        writeln!(
            w,
            "| {} | {} | {:.4} | {:.2} | {} |",
            e.scenario,
            e.model,
            e.error,
            e.tolerance,
            e.verdict.label()
        )?;
    }
    writeln!(w)?;

    writeln!(w, "## Details")?;
    for e in &report.results {
        writeln!(w)?;
        writeln!(w, "### {} / {}", e.scenario, e.model)?;
        writeln!(w)?;
        writeln!(w, "- Ground truth: {}", format_distribution(&e.ground_truth))?;
        writeln!(w, "- Estimated: {}", format_distribution(&e.estimated))?;
        writeln!(
            w,
            "- Samples: {} ({} conversions), checksum `{}`",
            e.samples, e.conversions, e.dataset_checksum
        )?;
        if let Some(msg) = &e.model_error {
            writeln!(w, "- Model error: {}", msg)?;
        }
    }
    writeln!(w)?;
    writeln!(
        w,
        "**Final Status:** {}/{} tests passed.",
        report.passed, report.total_tests
    )?;
    w.flush()
}

/// `{A: 0.500, B: 0.500}` with labels in sorted order.
pub fn format_distribution(d: &CreditDistribution) -> String {
    let parts: Vec<String> = d.iter().map(|(k, v)| format!("{k}: {v:.3}")).collect();
    format!("{{{}}}", parts.join(", "))
}

// =============================================================================
// Sinks
// =============================================================================

/// Destination for a finished suite report.
pub trait ReportSink {
    fn save(&mut self, report: &SuiteReport) -> Result<()>;
}

/// Writes `causal_report_<timestamp>.json` into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    last_path: Option<PathBuf>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_path: None,
        }
    }

    /// Path of the most recently written report.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl ReportSink for JsonFileSink {
    fn save(&mut self, report: &SuiteReport) -> Result<()> {
        let path = self.dir.join(report.file_name());
        write_json_report(report, &path)?;
        info!(path = %path.display(), "report saved");
        self.last_path = Some(path);
        Ok(())
    }
}

/// Writes a Markdown rendering to a fixed path.
#[derive(Debug, Clone)]
pub struct MarkdownFileSink {
    path: PathBuf,
}

impl MarkdownFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for MarkdownFileSink {
    fn save(&mut self, report: &SuiteReport) -> Result<()> {
        write_markdown_report(report, &self.path)?;
        info!(path = %self.path.display(), "markdown report saved");
        Ok(())
    }
}

/// Prints a PASS/FAIL table to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    /// Also print ground truth and estimates per entry.
    pub verbose: bool,
}

impl ReportSink for ConsoleSink {
    fn save(&mut self, report: &SuiteReport) -> Result<()> {
        println!("{}", "=".repeat(60));
        println!("CAUSAL INFERENCE TEST SUITE - {}", report.suite_id);
        println!("{}", "=".repeat(60));
        for e in &report.results {
            println!(
                "{:<24} {:<12} error={:.4} tol={:.2} [{}]",
                e.scenario,
                e.model,
                e.error,
                e.tolerance,
                e.verdict.label()
            );
            if self.verbose {
                println!("    ground truth: {}", format_distribution(&e.ground_truth));
                println!("    estimated:    {}", format_distribution(&e.estimated));
            }
            if let Some(msg) = &e.model_error {
                println!("    {}", msg);
            }
        }
        println!("{}", "-".repeat(60));
        println!(
            "Final Status: {}/{} tests passed.",
            report.passed, report.total_tests
        );
        Ok(())
    }
}
