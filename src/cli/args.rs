//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{InputPaths, LoadOptions, OutputPaths};

/// Engagement prep - clean and join article, engagement and discipline data
#[derive(Parser, Debug)]
#[command(name = "engagement-prep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Article metadata (doi, title, author, publication_date)
    #[arg(long, default_value = "data/input/plos_one_articles.csv")]
    pub articles: PathBuf,

    /// Graph API query details, one row per response
    #[arg(long, default_value = "data/input/query_details.csv")]
    pub details: PathBuf,

    /// Graph API engagement counts per DOI
    #[arg(long, default_value = "data/input/graph_api_counts.csv")]
    pub fb_metrics: PathBuf,

    /// Third-party aggregator counts per DOI (facebook, twitter)
    #[arg(long, default_value = "data/input/altmetric_counts.csv")]
    pub am_metrics: PathBuf,

    /// Semicolon-delimited discipline classification table
    #[arg(
        long,
        default_value = "data/external/PLOS_2015-2017_idArt-DOI-PY-Journal-Title-LargerDiscipline-Discipline-Specialty.csv"
    )]
    pub disciplines: PathBuf,

    /// Output path for the cleaned articles table
    #[arg(long, default_value = "data/articles.csv")]
    pub out_articles: PathBuf,

    /// Output path for the filtered responses table
    #[arg(long, default_value = "data/responses.csv")]
    pub out_responses: PathBuf,

    /// Write a JSON report of all counts to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Keep only articles published in or after this year
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Number of rows to use for schema inference.
    /// Higher values improve type detection for ambiguous columns but may be slower.
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Paths of the five input files.
    pub fn input_paths(&self) -> InputPaths {
        InputPaths {
            articles: self.articles.clone(),
            details: self.details.clone(),
            fb_metrics: self.fb_metrics.clone(),
            am_metrics: self.am_metrics.clone(),
            disciplines: self.disciplines.clone(),
        }
    }

    /// Paths of the two output tables.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            articles: self.out_articles.clone(),
            responses: self.out_responses.clone(),
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            infer_schema_length: self.infer_schema_length,
            min_year: self.min_year,
        }
    }
}
