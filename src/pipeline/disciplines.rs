//! Discipline matching
//!
//! Articles first take the discipline labels of the record with the same DOI.
//! Articles still without a discipline fall back to the record whose
//! normalized title equals theirs. When several records compete for the same
//! DOI or title, the one with the smallest specialty label wins (nulls last,
//! then file order).

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::frame::first_per_key;
use super::loader::DISCIPLINE_FIELDS;

/// Column holding the normalized title during matching
pub const TITLE_KEY: &str = "title_key";

const TITLE_SUFFIX: &str = "_by_title";
const TITLE_MATCHED: &str = "matched_by_title";

/// Lowercase `title` and drop every character that is not a letter or digit.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Whether an article is known to be absent from the discipline dataset:
/// authored by PLOS itself, a correction, or a retraction.
pub fn is_outside_discipline_dataset(author: Option<&str>, title: Option<&str>) -> bool {
    author.is_some_and(|a| a.contains("PLOS"))
        || title.is_some_and(|t| t.contains("Correction: ") || t.contains("Retraction: "))
}

/// Counts describing how disciplines were attached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisciplineCoverage {
    /// Article DOIs with more than one discipline record
    pub ambiguous_dois: usize,
    /// Normalized titles used in the fallback that map to several records
    pub ambiguous_titles: usize,
    pub matched_by_doi: usize,
    pub missing_after_doi: usize,
    pub matched_by_title: usize,
    pub missing_after_title: usize,
    pub with_discipline: usize,
    pub plos_authored: usize,
    pub corrections: usize,
    pub retractions: usize,
    /// Articles flagged as outside the discipline dataset, matched or not
    pub not_in_dataset: usize,
    /// Still-missing articles that are not flagged as outside the dataset
    pub actual_missing: usize,
}

/// Articles with discipline labels attached, plus coverage counts
#[derive(Debug, Clone)]
pub struct DisciplineOutcome {
    pub articles: DataFrame,
    pub coverage: DisciplineCoverage,
}

/// Run both matching passes over the articles.
pub fn match_disciplines(articles: &DataFrame, disciplines: &DataFrame) -> Result<DisciplineOutcome> {
    let mut coverage = DisciplineCoverage {
        ambiguous_dois: count_ambiguous(articles, disciplines, "doi")?,
        ..Default::default()
    };

    let by_doi = match_by_doi(articles, disciplines)?;
    coverage.matched_by_doi = count_present(&by_doi, "discipline")?;
    coverage.missing_after_doi = by_doi.height() - coverage.matched_by_doi;

    let pending = with_title_key(&by_doi)?;
    let pending_missing = pending
        .clone()
        .lazy()
        .filter(col("discipline").is_null())
        .collect()?;
    let keyed_disciplines = with_title_key(disciplines)?;
    coverage.ambiguous_titles = count_ambiguous(&pending_missing, &keyed_disciplines, TITLE_KEY)?;

    let (matched, title_matches) = match_by_title(&by_doi, disciplines)?;
    coverage.matched_by_title = title_matches;
    coverage.with_discipline = count_present(&matched, "discipline")?;
    coverage.missing_after_title = matched.height() - coverage.with_discipline;

    tally_outside_dataset(&matched, &mut coverage)?;

    Ok(DisciplineOutcome {
        articles: matched,
        coverage,
    })
}

/// Left-join discipline labels by exact DOI. Articles keep their row even
/// when nothing matches.
pub fn match_by_doi(articles: &DataFrame, disciplines: &DataFrame) -> Result<DataFrame> {
    let candidates = pick_per_key(disciplines, "doi")?;
    let labels: Vec<Expr> = std::iter::once(col("doi"))
        .chain(DISCIPLINE_FIELDS.iter().map(|f| col(*f)))
        .collect();

    let joined = articles
        .clone()
        .lazy()
        .join(
            candidates.lazy().select(labels),
            [col("doi")],
            [col("doi")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;
    Ok(joined)
}

/// Fill discipline labels of articles whose `discipline` is still null from
/// the record with the same normalized title. Returns the updated table and
/// the number of articles filled this way.
pub fn match_by_title(articles: &DataFrame, disciplines: &DataFrame) -> Result<(DataFrame, usize)> {
    let keyed_articles = with_title_key(articles)?;
    let keyed_disciplines = with_title_key(disciplines)?;
    let candidates = pick_per_key(&keyed_disciplines, TITLE_KEY)?;

    let labels: Vec<Expr> = std::iter::once(col(TITLE_KEY))
        .chain(
            DISCIPLINE_FIELDS
                .iter()
                .map(|f| col(*f).alias(format!("{}{}", f, TITLE_SUFFIX))),
        )
        .chain(std::iter::once(lit(true).alias(TITLE_MATCHED)))
        .collect();

    let take_title = col("discipline")
        .is_null()
        .and(col(TITLE_MATCHED).is_not_null());
    let mut updates: Vec<Expr> = DISCIPLINE_FIELDS
        .iter()
        .map(|f| {
            when(take_title.clone())
                .then(col(format!("{}{}", f, TITLE_SUFFIX)))
                .otherwise(col(*f))
                .alias(*f)
        })
        .collect();
    updates.push(take_title.alias(TITLE_MATCHED));

    let joined = keyed_articles
        .lazy()
        .join(
            candidates.lazy().select(labels),
            [col(TITLE_KEY)],
            [col(TITLE_KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns(updates)
        .collect()?;

    let filled = joined
        .column(TITLE_MATCHED)?
        .bool()?
        .into_iter()
        .filter(|m| *m == Some(true))
        .count();

    let mut helpers: Vec<String> = DISCIPLINE_FIELDS
        .iter()
        .map(|f| format!("{}{}", f, TITLE_SUFFIX))
        .collect();
    helpers.push(TITLE_MATCHED.to_string());
    helpers.push(TITLE_KEY.to_string());

    Ok((joined.drop_many(helpers), filled))
}

/// Copy of `df` with a normalized-title key column. Titles that normalize to
/// nothing get a null key and never match.
pub fn with_title_key(df: &DataFrame) -> Result<DataFrame> {
    let keys: StringChunked = df
        .column("title")?
        .str()?
        .into_iter()
        .map(|title| title.map(normalize_title).filter(|key| !key.is_empty()))
        .collect();

    let mut keyed = df.clone();
    keyed.with_column(keys.with_name(TITLE_KEY.into()).into_series())?;
    Ok(keyed)
}

/// One discipline record per key: smallest specialty first, nulls last,
/// remaining ties in file order.
fn pick_per_key(disciplines: &DataFrame, key: &str) -> Result<DataFrame> {
    let sorted = disciplines
        .clone()
        .lazy()
        .sort_by_exprs(
            [col(key), col("specialty")],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(first_per_key(&sorted, key)?)
}

/// Number of distinct `key` values of `articles` that map to more than one
/// discipline record.
fn count_ambiguous(articles: &DataFrame, disciplines: &DataFrame, key: &str) -> Result<usize> {
    let mut records: HashMap<&str, usize> = HashMap::new();
    for k in disciplines.column(key)?.str()?.into_iter().flatten() {
        *records.entry(k).or_default() += 1;
    }

    let mut seen = std::collections::HashSet::new();
    Ok(articles
        .column(key)?
        .str()?
        .into_iter()
        .flatten()
        .filter(|k| seen.insert(*k) && records.get(k).is_some_and(|n| *n > 1))
        .count())
}

fn count_present(df: &DataFrame, column: &str) -> Result<usize> {
    let values = df.column(column)?;
    Ok(values.len() - values.null_count())
}

fn tally_outside_dataset(articles: &DataFrame, coverage: &mut DisciplineCoverage) -> Result<()> {
    let authors = articles.column("author")?.str()?;
    let titles = articles.column("title")?.str()?;
    let disciplines = articles.column("discipline")?.str()?;

    let mut flagged_missing = 0;
    for ((author, title), discipline) in authors
        .into_iter()
        .zip(titles.into_iter())
        .zip(disciplines.into_iter())
    {
        if author.is_some_and(|a| a.contains("PLOS")) {
            coverage.plos_authored += 1;
        }
        if title.is_some_and(|t| t.contains("Correction: ")) {
            coverage.corrections += 1;
        }
        if title.is_some_and(|t| t.contains("Retraction: ")) {
            coverage.retractions += 1;
        }
        if is_outside_discipline_dataset(author, title) {
            coverage.not_in_dataset += 1;
            if discipline.is_none() {
                flagged_missing += 1;
            }
        }
    }

    coverage.actual_missing = coverage.missing_after_title - flagged_missing;
    Ok(())
}
