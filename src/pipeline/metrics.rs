//! Engagement metric normalization
//!
//! Raw counts keep their value under `<CODE>_og`. The cleaned `<CODE>` field
//! treats a raw zero as "not observed": the collector cannot tell a real zero
//! from a query that returned nothing.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

/// Raw source column and the short code it is published under
pub const METRIC_CODES: [(&str, &str); 5] = [
    ("twitter", "TW"),
    ("facebook", "POS"),
    ("shares", "AES"),
    ("reactions", "AER"),
    ("comments", "AEC"),
];

/// Order in which cleaned metrics are appended to the articles
pub const CLEANED_ORDER: [&str; 5] = ["AES", "POS", "TW", "AER", "AEC"];

/// Name of the preserved raw column for a metric code.
pub fn raw_column(code: &str) -> String {
    format!("{}_og", code)
}

/// Cleaned value for a raw count: zero and NaN become "not observed".
pub fn clean_count(raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Zero-count diagnostics over the raw metric values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricDiagnostics {
    /// Articles whose shares, reactions and comments are all exactly zero
    pub zero_engagement: usize,
    /// Articles with at least one non-zero share, reaction or comment
    pub any_engagement: usize,
    /// Articles with a raw POS of zero
    pub zero_posts: usize,
    /// Articles with a raw TW of zero
    pub zero_tweets: usize,
}

/// Rename raw metric columns to their `<CODE>_og` names.
pub fn rename_metric_columns(metrics: &DataFrame) -> Result<DataFrame> {
    let mut renamed = metrics.clone();
    for (source, code) in METRIC_CODES {
        renamed
            .rename(source, raw_column(code).into())
            .with_context(|| format!("Metric column '{}' not found", source))?;
    }
    Ok(renamed)
}

/// Rename raw columns and add the five cleaned fields.
pub fn normalize_metrics(metrics: &DataFrame) -> Result<DataFrame> {
    let mut normalized = rename_metric_columns(metrics)?;
    for (_, code) in METRIC_CODES {
        let cleaned = clean_column(&normalized, &raw_column(code), code)?;
        normalized.with_column(cleaned)?;
    }
    Ok(normalized)
}

/// Apply [`clean_count`] to one column of an already-normalized table.
pub fn clean_column(df: &DataFrame, source: &str, name: &str) -> Result<Series> {
    let raw = df.column(source)?.cast(&DataType::Float64)?;
    let cleaned: Float64Chunked = raw.f64()?.into_iter().map(clean_count).collect();
    Ok(cleaned.with_name(name.into()).into_series())
}

/// Left-join the cleaned metrics onto the articles. Articles without a metric
/// row get nulls for all five fields.
pub fn attach_metrics(articles: &DataFrame, normalized: &DataFrame) -> Result<DataFrame> {
    let selection: Vec<Expr> = std::iter::once(col("doi"))
        .chain(CLEANED_ORDER.iter().map(|code| col(*code)))
        .collect();

    let joined = articles
        .clone()
        .lazy()
        .join(
            normalized.clone().lazy().select(selection),
            [col("doi")],
            [col("doi")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;
    Ok(joined)
}

/// Zero-count diagnostics for a normalized metric table.
pub fn diagnose_metrics(normalized: &DataFrame) -> Result<MetricDiagnostics> {
    let height = normalized.height();
    let values = |code: &str| -> Result<Vec<Option<f64>>> {
        let column = normalized.column(&raw_column(code))?.cast(&DataType::Float64)?;
        Ok(column.f64()?.into_iter().collect())
    };

    let shares = values("AES")?;
    let reactions = values("AER")?;
    let comments = values("AEC")?;
    let posts = values("POS")?;
    let tweets = values("TW")?;

    let mut diagnostics = MetricDiagnostics::default();
    for row in 0..height {
        let engagement = [shares[row], reactions[row], comments[row]];
        if engagement.iter().all(|v| *v == Some(0.0)) {
            diagnostics.zero_engagement += 1;
        }
        if engagement.iter().any(|v| clean_count(*v).is_some()) {
            diagnostics.any_engagement += 1;
        }
        if posts[row] == Some(0.0) {
            diagnostics.zero_posts += 1;
        }
        if tweets[row] == Some(0.0) {
            diagnostics.zero_tweets += 1;
        }
    }
    Ok(diagnostics)
}
