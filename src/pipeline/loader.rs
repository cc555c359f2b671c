//! Input loading for articles, query details, metrics and disciplines
//!
//! Every loader validates its required columns, casts key columns to strings
//! and rejects the file as a whole on the first problem.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use super::error::{PrepareError, Result};
use super::frame::{cast_columns, find_duplicate_key, first_per_key, key_set, retain_rows};

/// Author label for PLOS articles published without author information
pub const DEFAULT_AUTHOR: &str = "PLOS ONE";

/// Length of the tag prefixed to every DOI in the disciplines file
const DOI_TAG_LEN: usize = 4;

pub const ARTICLE_COLUMNS: [&str; 4] = ["doi", "title", "author", "publication_date"];
pub const RESPONSE_COLUMNS: [&str; 9] = [
    "id",
    "doi",
    "og_id",
    "og_updated_time",
    "added_on",
    "received_at",
    "reactions",
    "shares",
    "comments",
];
pub const FB_METRIC_COLUMNS: [&str; 4] = ["doi", "shares", "reactions", "comments"];
pub const AM_METRIC_COLUMNS: [&str; 3] = ["doi", "facebook", "twitter"];
pub const DISCIPLINE_SOURCE_COLUMNS: [&str; 5] = [
    "DOI",
    "title",
    "EGrande_Discipline",
    "EDiscipline",
    "ESpecialite",
];

/// Discipline labels as named after loading
pub const DISCIPLINE_FIELDS: [&str; 3] = ["grand_discipline", "discipline", "specialty"];

/// Locations of the five input files
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub articles: PathBuf,
    pub details: PathBuf,
    pub fb_metrics: PathBuf,
    pub am_metrics: PathBuf,
    pub disciplines: PathBuf,
}

/// Options that shape how inputs are read
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Rows used for CSV schema inference (0 = full scan)
    pub infer_schema_length: usize,
    /// Keep only articles published in or after this year
    pub min_year: Option<i32>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: 10_000,
            min_year: None,
        }
    }
}

/// All input tables, as loaded and before any cleaning
#[derive(Debug, Clone)]
pub struct RawTables {
    /// One row per DOI, with derived `year`
    pub articles: DataFrame,
    /// One row per response id, not yet restricted to the articles
    pub responses: DataFrame,
    /// Graph API counts, one row per DOI
    pub fb_metrics: DataFrame,
    /// Third-party aggregator counts, one row per DOI
    pub am_metrics: DataFrame,
    /// Outer join of both metric sources on DOI
    pub metrics: DataFrame,
    /// Discipline records, possibly several per DOI
    pub disciplines: DataFrame,
}

/// Load every input file and restrict metrics to the loaded articles.
///
/// Responses stay complete: the og_id check needs every DOI an object was
/// attributed to, including DOIs outside the article table.
pub fn load_inputs(paths: &InputPaths, options: LoadOptions) -> Result<RawTables> {
    let articles = load_articles(&paths.articles, options)?;
    let article_dois = key_set(&articles, "doi")?;

    let responses = load_responses(&paths.details, options.infer_schema_length)?;

    let fb_metrics = load_fb_metrics(&paths.fb_metrics, options.infer_schema_length)?;
    let fb_metrics = retain_rows(&fb_metrics, "doi", |doi| {
        doi.is_some_and(|d| article_dois.contains(d))
    })?;
    let am_metrics = load_am_metrics(&paths.am_metrics, options.infer_schema_length)?;
    let am_metrics = retain_rows(&am_metrics, "doi", |doi| {
        doi.is_some_and(|d| article_dois.contains(d))
    })?;
    let metrics = merge_metric_sources(&fb_metrics, &am_metrics)?;

    let disciplines = load_disciplines(&paths.disciplines, options.infer_schema_length)?;

    Ok(RawTables {
        articles,
        responses,
        fb_metrics,
        am_metrics,
        metrics,
        disciplines,
    })
}

/// Load the articles file, derive `year`, default missing authors and apply
/// the optional year filter.
pub fn load_articles(path: &Path, options: LoadOptions) -> Result<DataFrame> {
    let mut df = read_csv(path, b',', options.infer_schema_length, false)?;
    require_columns(&df, path, &ARTICLE_COLUMNS)?;
    cast_columns(&mut df, &ARTICLE_COLUMNS, &DataType::String)?;

    if let Some(row) = df.column("doi")?.str()?.into_iter().position(|d| d.is_none()) {
        return Err(PrepareError::MalformedRow {
            path: path.to_path_buf(),
            row,
            message: "missing doi".to_string(),
        });
    }
    reject_duplicates(&df, path, "doi")?;

    let years = derive_years(&df, path)?;
    df.with_column(years.into_series())?;

    let mut lf = df
        .lazy()
        .with_column(col("author").fill_null(lit(DEFAULT_AUTHOR)));
    if let Some(min_year) = options.min_year {
        lf = lf.filter(col("year").gt_eq(lit(min_year)));
    }

    Ok(lf.collect()?)
}

/// Load the query details file. Date-like columns are parsed where possible.
pub fn load_responses(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let mut df = read_csv(path, b',', infer_schema_length, true)?;
    require_columns(&df, path, &RESPONSE_COLUMNS)?;
    cast_columns(&mut df, &["id", "doi", "og_id"], &DataType::String)?;
    cast_counts(&mut df, path, &["reactions", "shares", "comments"])?;
    reject_duplicates(&df, path, "id")?;
    Ok(df)
}

/// Load the graph API counts.
pub fn load_fb_metrics(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let mut df = read_csv(path, b',', infer_schema_length, false)?;
    require_columns(&df, path, &FB_METRIC_COLUMNS)?;
    cast_columns(&mut df, &["doi"], &DataType::String)?;
    cast_counts(&mut df, path, &FB_METRIC_COLUMNS[1..])?;
    if df.get_column_index("plugin_comments").is_some() {
        cast_counts(&mut df, path, &["plugin_comments"])?;
    }
    Ok(first_per_key(&df, "doi")?)
}

/// Load the third-party aggregator counts.
pub fn load_am_metrics(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let mut df = read_csv(path, b',', infer_schema_length, false)?;
    require_columns(&df, path, &AM_METRIC_COLUMNS)?;
    cast_columns(&mut df, &["doi"], &DataType::String)?;
    cast_counts(&mut df, path, &AM_METRIC_COLUMNS[1..])?;
    Ok(first_per_key(&df, "doi")?)
}

/// Outer-join both metric sources so a DOI known to only one of them keeps
/// nulls for the other's fields.
pub fn merge_metric_sources(fb_metrics: &DataFrame, am_metrics: &DataFrame) -> Result<DataFrame> {
    let merged = fb_metrics
        .clone()
        .lazy()
        .join(
            am_metrics.clone().lazy(),
            [col("doi")],
            [col("doi")],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .collect()?;
    Ok(merged)
}

/// Load the semicolon-delimited disciplines file, strip the DOI tag and rename
/// the label columns.
pub fn load_disciplines(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let mut df = read_csv(path, b';', infer_schema_length, false)?;
    require_columns(&df, path, &DISCIPLINE_SOURCE_COLUMNS)?;
    cast_columns(&mut df, &DISCIPLINE_SOURCE_COLUMNS, &DataType::String)?;

    let stripped: StringChunked = df
        .column("DOI")?
        .str()?
        .into_iter()
        .map(|doi| doi.map(strip_doi_tag))
        .collect();
    df.with_column(stripped.with_name("DOI".into()).into_series())?;

    let renames = [
        ("DOI", "doi"),
        ("EGrande_Discipline", DISCIPLINE_FIELDS[0]),
        ("EDiscipline", DISCIPLINE_FIELDS[1]),
        ("ESpecialite", DISCIPLINE_FIELDS[2]),
    ];
    for (from, to) in renames {
        df.rename(from, to.into())?;
    }
    Ok(df)
}

/// Drop the leading tag from a disciplines-file DOI.
pub fn strip_doi_tag(doi: &str) -> String {
    doi.chars().skip(DOI_TAG_LEN).collect()
}

/// Year of an ISO date, optionally followed by a time part.
pub fn parse_year(value: &str) -> Option<i32> {
    NaiveDate::parse_and_remainder(value.trim(), "%Y-%m-%d")
        .ok()
        .map(|(date, _)| date.year())
}

fn derive_years(df: &DataFrame, path: &Path) -> Result<Int32Chunked> {
    let years = df
        .column("publication_date")?
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, date)| match date {
            None => Ok(None),
            Some(date) => parse_year(date).map(Some).ok_or_else(|| PrepareError::MalformedRow {
                path: path.to_path_buf(),
                row,
                message: format!("unparseable publication_date '{}'", date),
            }),
        })
        .collect::<Result<Int32Chunked>>()?;
    Ok(years.with_name("year".into()))
}

fn read_csv(
    path: &Path,
    separator: u8,
    infer_schema_length: usize,
    try_parse_dates: bool,
) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PrepareError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    LazyCsvReader::new(path)
        .with_separator(separator)
        .with_infer_schema_length(schema_length)
        .with_try_parse_dates(try_parse_dates)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|source| PrepareError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// Cast count columns to f64. A value that is present but not a number is a
/// malformed row, never a silent null.
fn cast_counts(df: &mut DataFrame, path: &Path, columns: &[&str]) -> Result<()> {
    for name in columns {
        let cast = {
            let original = df.column(name)?;
            match original.strict_cast(&DataType::Float64) {
                Ok(cast) => cast,
                Err(_) => return Err(non_numeric_row(original, path, name)?),
            }
        };
        df.with_column(cast)?;
    }
    Ok(())
}

/// Locate the first value lost by a lenient cast and describe it.
fn non_numeric_row(original: &Column, path: &Path, name: &str) -> Result<PrepareError> {
    let lenient = original.cast(&DataType::Float64)?;
    let before = original.is_null();
    let after = lenient.is_null();
    let row = before
        .into_iter()
        .zip(after.into_iter())
        .position(|(before, after)| before == Some(false) && after == Some(true))
        .unwrap_or(0);
    Ok(PrepareError::MalformedRow {
        path: path.to_path_buf(),
        row,
        message: format!("non-numeric value {} in column '{}'", original.get(row)?, name),
    })
}

fn require_columns(df: &DataFrame, path: &Path, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|c| df.get_column_index(c).is_none()) {
        Some(column) => Err(PrepareError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

fn reject_duplicates(df: &DataFrame, path: &Path, column: &str) -> Result<()> {
    match find_duplicate_key(df, column)? {
        Some(key) => Err(PrepareError::DuplicateKey {
            path: path.to_path_buf(),
            column: column.to_string(),
            key,
        }),
        None => Ok(()),
    }
}
