//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use engagement_prep::pipeline::{InputPaths, OutputPaths};
use polars::prelude::*;
use tempfile::TempDir;

/// Write raw CSV text to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// A complete set of input files in a temporary directory.
///
/// Scenario:
/// - D1 and D2 share object id X, D3 has its own object id Y, D4 has none
/// - D3: facebook 0, twitter 5
/// - D3 matched by DOI, D4 only by normalized title
pub struct Fixture {
    pub dir: TempDir,
    pub inputs: InputPaths,
}

pub const ARTICLES_CSV: &str = "\
doi,title,author,publication_date
D1,First Article,A. Author,2015-02-01
D2,Second Article,B. Author,2016-03-01
D3,Third Article,,2016-04-01
D4,\"The Study: A Test!\",C. Author,2017-05-01
";

pub const DETAILS_CSV: &str = "\
id,doi,og_id,og_updated_time,added_on,received_at,reactions,shares,comments
r1,D1,X,2018-01-01,2018-01-01,2018-01-02,1,2,0
r2,D2,X,2018-01-01,2018-01-01,2018-01-02,1,2,0
r3,D3,Y,2018-01-01,2018-01-01,2018-01-02,0,0,0
r4,D3,Y,2018-02-01,2018-02-01,2018-02-02,3,0,1
";

pub const FB_METRICS_CSV: &str = "\
doi,shares,reactions,comments,plugin_comments
D1,2,1,0,0
D2,2,1,0,0
D3,0,3,1,0
";

pub const AM_METRICS_CSV: &str = "\
doi,facebook,twitter
D1,1,1
D3,0,5
D4,2,0
";

pub const DISCIPLINES_CSV: &str = "\
DOI;title;EGrande_Discipline;EDiscipline;ESpecialite
doi:D1;First Article;Natural Sciences;Biology;Ecology
doi:D3;Third Article;Health;Clinical Medicine;Cardiology
doi:XXX;the study a test;Social Sciences;Psychology;Cognition
";

impl Fixture {
    pub fn new() -> Self {
        Self::with_files(
            ARTICLES_CSV,
            DETAILS_CSV,
            FB_METRICS_CSV,
            AM_METRICS_CSV,
            DISCIPLINES_CSV,
        )
    }

    pub fn with_files(
        articles: &str,
        details: &str,
        fb_metrics: &str,
        am_metrics: &str,
        disciplines: &str,
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let inputs = InputPaths {
            articles: write_file(dir.path(), "articles.csv", articles),
            details: write_file(dir.path(), "details.csv", details),
            fb_metrics: write_file(dir.path(), "fb_metrics.csv", fb_metrics),
            am_metrics: write_file(dir.path(), "am_metrics.csv", am_metrics),
            disciplines: write_file(dir.path(), "disciplines.csv", disciplines),
        };
        Self { dir, inputs }
    }

    pub fn outputs(&self) -> OutputPaths {
        OutputPaths {
            articles: self.dir.path().join("out").join("articles.csv"),
            responses: self.dir.path().join("out").join("responses.csv"),
        }
    }
}

/// Row index of `key` in column `key_column`.
pub fn row_of(df: &DataFrame, key_column: &str, key: &str) -> Option<usize> {
    df.column(key_column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .position(|k| k == Some(key))
}

/// String value of `column` in the row whose doi is `doi`.
pub fn string_field(df: &DataFrame, doi: &str, column: &str) -> Option<String> {
    let row = row_of(df, "doi", doi).unwrap_or_else(|| panic!("doi {} not in table", doi));
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .get(row)
        .map(str::to_string)
}

/// Numeric value of `column` in the row whose doi is `doi`.
pub fn float_field(df: &DataFrame, doi: &str, column: &str) -> Option<f64> {
    let row = row_of(df, "doi", doi).unwrap_or_else(|| panic!("doi {} not in table", doi));
    df.column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .get(row)
}

/// Sorted non-null values of a string column.
pub fn sorted_keys(df: &DataFrame, column: &str) -> Vec<String> {
    let mut keys: Vec<String> = df
        .column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    keys.sort();
    keys
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
