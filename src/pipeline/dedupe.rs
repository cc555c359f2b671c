//! Removal of articles hit by the social graph aggregation defect
//!
//! The graph API sometimes merges several URLs into one object. An `og_id`
//! that responses attribute to more than one DOI is "bad", and every DOI that
//! ever received a response carrying a bad `og_id` is dropped from articles,
//! metrics and responses.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::frame::{key_set, retain_rows};

/// Article counts for one publication year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearCounts {
    /// `None` for articles without a publication date
    pub year: Option<i32>,
    pub all_articles: usize,
    pub dropped: usize,
    pub retained: usize,
}

/// Tables after deduplication plus what was removed
#[derive(Debug, Clone)]
pub struct DedupeOutcome {
    pub articles: DataFrame,
    pub responses: DataFrame,
    pub metrics: DataFrame,
    pub bad_og_ids: BTreeSet<String>,
    pub bad_dois: BTreeSet<String>,
    /// Year-bucketed counts, ordered by year with the undated bucket first
    pub by_year: Vec<YearCounts>,
}

impl DedupeOutcome {
    /// Sum over all year buckets
    pub fn totals(&self) -> YearCounts {
        self.by_year.iter().fold(YearCounts::default(), |acc, y| YearCounts {
            year: None,
            all_articles: acc.all_articles + y.all_articles,
            dropped: acc.dropped + y.dropped,
            retained: acc.retained + y.retained,
        })
    }
}

/// Object ids that responses attribute to more than one distinct DOI.
pub fn find_bad_og_ids(responses: &DataFrame) -> Result<BTreeSet<String>> {
    let shared = responses
        .clone()
        .lazy()
        .filter(col("og_id").is_not_null().and(col("doi").is_not_null()))
        .group_by([col("og_id")])
        .agg([col("doi").n_unique().alias("doi_count")])
        .filter(col("doi_count").gt(lit(1u32)))
        .collect()?;

    Ok(shared
        .column("og_id")?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Every DOI with at least one response carrying a bad object id.
pub fn find_bad_dois(responses: &DataFrame, bad_og_ids: &BTreeSet<String>) -> Result<BTreeSet<String>> {
    let dois = responses.column("doi")?.str()?;
    let og_ids = responses.column("og_id")?.str()?;

    Ok(dois
        .into_iter()
        .zip(og_ids.into_iter())
        .filter_map(|(doi, og_id)| match (doi, og_id) {
            (Some(doi), Some(og_id)) if bad_og_ids.contains(og_id) => Some(doi.to_string()),
            _ => None,
        })
        .collect())
}

/// Drop bad DOIs from all three tables and restrict responses and metrics to
/// the surviving articles.
pub fn remove_misattributed(
    articles: &DataFrame,
    responses: &DataFrame,
    metrics: &DataFrame,
) -> Result<DedupeOutcome> {
    let bad_og_ids = find_bad_og_ids(responses)?;
    let bad_dois = find_bad_dois(responses, &bad_og_ids)?;

    let by_year = count_by_year(articles, &bad_dois)?;

    let kept_articles = retain_rows(articles, "doi", |doi| {
        doi.is_some_and(|d| !bad_dois.contains(d))
    })?;
    let kept_dois: HashSet<String> = key_set(&kept_articles, "doi")?;
    let kept_responses = retain_rows(responses, "doi", |doi| {
        doi.is_some_and(|d| kept_dois.contains(d))
    })?;
    let kept_metrics = retain_rows(metrics, "doi", |doi| {
        doi.is_some_and(|d| kept_dois.contains(d))
    })?;

    Ok(DedupeOutcome {
        articles: kept_articles,
        responses: kept_responses,
        metrics: kept_metrics,
        bad_og_ids,
        bad_dois,
        by_year,
    })
}

fn count_by_year(articles: &DataFrame, bad_dois: &BTreeSet<String>) -> Result<Vec<YearCounts>> {
    let dois = articles.column("doi")?.str()?;
    let years = articles.column("year")?.i32()?;

    let mut buckets: BTreeMap<Option<i32>, YearCounts> = BTreeMap::new();
    for (doi, year) in dois.into_iter().zip(years.into_iter()) {
        let bucket = buckets.entry(year).or_insert_with(|| YearCounts {
            year,
            ..Default::default()
        });
        bucket.all_articles += 1;
        if doi.is_some_and(|d| bad_dois.contains(d)) {
            bucket.dropped += 1;
        } else {
            bucket.retained += 1;
        }
    }

    Ok(buckets.into_values().collect())
}
