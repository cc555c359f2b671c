//! Integration tests for input loading

use engagement_prep::pipeline::{
    load_articles, load_disciplines, load_inputs, load_responses, LoadOptions, PrepareError,
    DEFAULT_AUTHOR,
};
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_load_articles_derives_year() {
    let fixture = Fixture::new();
    let articles = load_articles(&fixture.inputs.articles, LoadOptions::default()).unwrap();

    assert_eq!(articles.height(), 4);
    assert_has_columns(&articles, &["doi", "title", "author", "publication_date", "year"]);

    let years: Vec<Option<i32>> = articles.column("year").unwrap().i32().unwrap().into_iter().collect();
    assert_eq!(years, vec![Some(2015), Some(2016), Some(2016), Some(2017)]);
}

#[test]
fn test_missing_author_defaults_to_plos_one() {
    let fixture = Fixture::new();
    let articles = load_articles(&fixture.inputs.articles, LoadOptions::default()).unwrap();

    assert_eq!(string_field(&articles, "D3", "author").as_deref(), Some(DEFAULT_AUTHOR));
    assert_eq!(string_field(&articles, "D1", "author").as_deref(), Some("A. Author"));
}

#[test]
fn test_min_year_filter() {
    let fixture = Fixture::new();
    let options = LoadOptions {
        min_year: Some(2016),
        ..LoadOptions::default()
    };
    let articles = load_articles(&fixture.inputs.articles, options).unwrap();

    assert_eq!(sorted_keys(&articles, "doi"), vec!["D2", "D3", "D4"]);
}

#[test]
fn test_missing_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.csv");

    let err = load_articles(&path, LoadOptions::default()).unwrap_err();
    assert!(matches!(err, PrepareError::MissingFile { .. }), "got {:?}", err);
}

#[test]
fn test_missing_column_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "articles.csv", "doi,title,author\nD1,T,A\n");

    let err = load_articles(&path, LoadOptions::default()).unwrap_err();
    match err {
        PrepareError::MissingColumn { column, .. } => assert_eq!(column, "publication_date"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_unparseable_date_is_malformed_row() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "articles.csv",
        "doi,title,author,publication_date\nD1,T,A,2016-01-01\nD2,T,A,someday\n",
    );

    let err = load_articles(&path, LoadOptions::default()).unwrap_err();
    match err {
        PrepareError::MalformedRow { row, .. } => assert_eq!(row, 1),
        other => panic!("expected MalformedRow, got {:?}", other),
    }
}

#[test]
fn test_duplicate_article_doi_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "articles.csv",
        "doi,title,author,publication_date\nD1,T,A,2016-01-01\nD1,U,B,2016-01-02\n",
    );

    let err = load_articles(&path, LoadOptions::default()).unwrap_err();
    assert!(matches!(err, PrepareError::DuplicateKey { .. }), "got {:?}", err);
}

#[test]
fn test_duplicate_response_id_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "details.csv",
        "id,doi,og_id,og_updated_time,added_on,received_at,reactions,shares,comments\n\
         r1,D1,X,2018-01-01,2018-01-01,2018-01-01,0,0,0\n\
         r1,D2,Y,2018-01-01,2018-01-01,2018-01-01,0,0,0\n",
    );

    let err = load_responses(&path, 100).unwrap_err();
    assert!(matches!(err, PrepareError::DuplicateKey { .. }), "got {:?}", err);
}

#[test]
fn test_numeric_og_ids_are_read_as_strings() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "details.csv",
        "id,doi,og_id,og_updated_time,added_on,received_at,reactions,shares,comments\n\
         1,D1,1234567890123,2018-01-01,2018-01-01,2018-01-01,0,0,0\n",
    );

    let responses = load_responses(&path, 100).unwrap();
    assert_eq!(responses.column("og_id").unwrap().dtype(), &DataType::String);
    assert_eq!(responses.column("id").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_load_disciplines_strips_tag_and_renames() {
    let fixture = Fixture::new();
    let disciplines = load_disciplines(&fixture.inputs.disciplines, 100).unwrap();

    assert_has_columns(&disciplines, &["doi", "title", "grand_discipline", "discipline", "specialty"]);
    assert_missing_columns(&disciplines, &["DOI", "EDiscipline"]);
    assert_eq!(sorted_keys(&disciplines, "doi"), vec!["D1", "D3", "XXX"]);
}

#[test]
fn test_metrics_outer_join_keeps_single_source_dois() {
    let fixture = Fixture::new();
    let raw = load_inputs(&fixture.inputs, LoadOptions::default()).unwrap();

    // D2 only in the graph API file, D4 only in the aggregator file
    assert_eq!(sorted_keys(&raw.metrics, "doi"), vec!["D1", "D2", "D3", "D4"]);
    assert_eq!(float_field(&raw.metrics, "D2", "facebook"), None);
    assert_eq!(float_field(&raw.metrics, "D2", "shares"), Some(2.0));
    assert_eq!(float_field(&raw.metrics, "D4", "shares"), None);
    assert_eq!(float_field(&raw.metrics, "D4", "facebook"), Some(2.0));
}

#[test]
fn test_metrics_restricted_to_loaded_articles() {
    let fixture = Fixture::with_files(
        ARTICLES_CSV,
        DETAILS_CSV,
        "doi,shares,reactions,comments\nD1,1,1,1\nD99,5,5,5\n",
        "doi,facebook,twitter\nD98,1,1\n",
        DISCIPLINES_CSV,
    );
    let raw = load_inputs(&fixture.inputs, LoadOptions::default()).unwrap();

    assert_eq!(sorted_keys(&raw.metrics, "doi"), vec!["D1"]);
}

#[test]
fn test_non_numeric_graph_api_count_is_malformed_row() {
    let fixture = Fixture::with_files(
        ARTICLES_CSV,
        DETAILS_CSV,
        "doi,shares,reactions,comments,plugin_comments\nD1,2,1,0,0\nD2,2,1,0,0\nD3,oops,3,1,0\n",
        AM_METRICS_CSV,
        DISCIPLINES_CSV,
    );

    let err = load_inputs(&fixture.inputs, LoadOptions::default()).unwrap_err();
    match err {
        PrepareError::MalformedRow { row, message, .. } => {
            assert_eq!(row, 2);
            assert!(message.contains("shares"), "message was: {}", message);
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
}

#[test]
fn test_non_numeric_aggregator_count_is_malformed_row() {
    let fixture = Fixture::with_files(
        ARTICLES_CSV,
        DETAILS_CSV,
        FB_METRICS_CSV,
        "doi,facebook,twitter\nD1,1,1\nD3,0,many\n",
        DISCIPLINES_CSV,
    );

    let err = load_inputs(&fixture.inputs, LoadOptions::default()).unwrap_err();
    match err {
        PrepareError::MalformedRow { row, message, .. } => {
            assert_eq!(row, 1);
            assert!(message.contains("twitter"), "message was: {}", message);
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
}

#[test]
fn test_non_numeric_response_count_is_malformed_row() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "details.csv",
        "id,doi,og_id,og_updated_time,added_on,received_at,reactions,shares,comments\n\
         r1,D1,X,2018-01-01,2018-01-01,2018-01-01,n/a,0,0\n",
    );

    let err = load_responses(&path, 100).unwrap_err();
    match err {
        PrepareError::MalformedRow { row, message, .. } => {
            assert_eq!(row, 0);
            assert!(message.contains("reactions"), "message was: {}", message);
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
}

#[test]
fn test_empty_counts_stay_missing() {
    let fixture = Fixture::with_files(
        ARTICLES_CSV,
        DETAILS_CSV,
        "doi,shares,reactions,comments\nD1,,1,0\n",
        AM_METRICS_CSV,
        DISCIPLINES_CSV,
    );

    let raw = load_inputs(&fixture.inputs, LoadOptions::default()).unwrap();
    assert_eq!(float_field(&raw.metrics, "D1", "shares"), None);
    assert_eq!(float_field(&raw.metrics, "D1", "reactions"), Some(1.0));
}
