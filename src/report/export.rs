//! JSON run report export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    write_all, DisciplineCoverage, InputPaths, InputStats, MetricDiagnostics, OutputPaths,
    Prepared, StagedFile, YearCounts,
};

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub tool_version: String,
    pub articles_file: String,
    pub details_file: String,
    pub fb_metrics_file: String,
    pub am_metrics_file: String,
    pub disciplines_file: String,
    pub out_articles_file: String,
    pub out_responses_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i32>,
}

/// What deduplication removed
#[derive(Debug, Serialize)]
pub struct DedupeReport {
    pub bad_og_ids: usize,
    pub bad_dois: Vec<String>,
    pub by_year: Vec<YearCounts>,
    pub totals: YearCounts,
}

/// Row counts of the written tables
#[derive(Debug, Serialize)]
pub struct OutputCounts {
    pub articles: usize,
    pub responses: usize,
}

/// Complete report of one preparation run
#[derive(Debug, Serialize)]
pub struct PreparationReport {
    pub metadata: RunMetadata,
    pub input: InputStats,
    pub dedupe: DedupeReport,
    pub metrics: MetricDiagnostics,
    pub disciplines: DisciplineCoverage,
    pub output: OutputCounts,
}

impl PreparationReport {
    pub fn new(
        inputs: &InputPaths,
        outputs: &OutputPaths,
        min_year: Option<i32>,
        input: InputStats,
        prepared: &Prepared,
    ) -> Self {
        let path = |p: &Path| p.display().to_string();
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                articles_file: path(&inputs.articles),
                details_file: path(&inputs.details),
                fb_metrics_file: path(&inputs.fb_metrics),
                am_metrics_file: path(&inputs.am_metrics),
                disciplines_file: path(&inputs.disciplines),
                out_articles_file: path(&outputs.articles),
                out_responses_file: path(&outputs.responses),
                min_year,
            },
            input,
            dedupe: DedupeReport {
                bad_og_ids: prepared.dedupe.bad_og_ids.len(),
                bad_dois: prepared.dedupe.bad_dois.iter().cloned().collect(),
                by_year: prepared.dedupe.by_year.clone(),
                totals: prepared.dedupe.totals(),
            },
            metrics: prepared.metric_diagnostics.clone(),
            disciplines: prepared.coverage.clone(),
            output: OutputCounts {
                articles: prepared.articles.height(),
                responses: prepared.responses.height(),
            },
        }
    }
}

/// Render the run report as pretty-printed JSON
pub fn render_preparation_report(report: &PreparationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize preparation report to JSON")
}

/// Export the run report to a JSON file
pub fn export_preparation_report(report: &PreparationReport, output_path: &Path) -> Result<()> {
    let json = render_preparation_report(report)?;
    write_all(&[StagedFile::Text {
        contents: &json,
        target: output_path,
    }])
    .with_context(|| format!("Failed to write preparation report to {}", output_path.display()))
}
