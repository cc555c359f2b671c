//! Composition of the cleaning stages
//!
//! Each stage takes tables by reference and returns new ones, so the whole
//! run is a pure function of the loaded inputs. The binary calls the same
//! stage functions one by one to report between them.

use anyhow::{Context, Result};
use polars::prelude::*;

use super::dedupe::{remove_misattributed, DedupeOutcome};
use super::disciplines::{match_disciplines, DisciplineCoverage, DisciplineOutcome};
use super::loader::RawTables;
use super::metrics::{attach_metrics, diagnose_metrics, normalize_metrics, MetricDiagnostics};

/// Final tables plus the observations gathered along the way
#[derive(Debug, Clone)]
pub struct Prepared {
    /// One row per retained DOI with cleaned metrics and discipline labels
    pub articles: DataFrame,
    /// Responses of retained articles only
    pub responses: DataFrame,
    pub dedupe: DedupeOutcome,
    pub metric_diagnostics: MetricDiagnostics,
    pub coverage: DisciplineCoverage,
}

impl Prepared {
    /// Combine the outcomes of the three stages.
    pub fn assemble(dedupe: DedupeOutcome, metrics: MetricStage, matched: DisciplineOutcome) -> Self {
        Self {
            articles: matched.articles,
            responses: dedupe.responses.clone(),
            dedupe,
            metric_diagnostics: metrics.diagnostics,
            coverage: matched.coverage,
        }
    }
}

/// Articles with cleaned metrics attached
#[derive(Debug, Clone)]
pub struct MetricStage {
    pub articles: DataFrame,
    pub diagnostics: MetricDiagnostics,
}

/// Drop articles whose responses carry a shared object id.
pub fn deduplicate(raw: &RawTables) -> Result<DedupeOutcome> {
    remove_misattributed(&raw.articles, &raw.responses, &raw.metrics)
        .context("Failed to remove misattributed articles")
}

/// Normalize the retained metrics and attach the cleaned fields to the
/// retained articles.
pub fn process_metrics(dedupe: &DedupeOutcome) -> Result<MetricStage> {
    let normalized = normalize_metrics(&dedupe.metrics).context("Failed to normalize metrics")?;
    let diagnostics = diagnose_metrics(&normalized)?;
    let articles = attach_metrics(&dedupe.articles, &normalized)?;
    Ok(MetricStage {
        articles,
        diagnostics,
    })
}

/// Attach discipline labels by DOI, then by normalized title.
pub fn assign_disciplines(articles: &DataFrame, raw: &RawTables) -> Result<DisciplineOutcome> {
    match_disciplines(articles, &raw.disciplines).context("Failed to match disciplines")
}

/// Deduplicate, normalize metrics and match disciplines.
pub fn prepare(raw: &RawTables) -> Result<Prepared> {
    let dedupe = deduplicate(raw)?;
    let metrics = process_metrics(&dedupe)?;
    let matched = assign_disciplines(&metrics.articles, raw)?;
    Ok(Prepared::assemble(dedupe, metrics, matched))
}
