//! Output writing
//!
//! Every output of a run is written to a temporary sibling first. Nothing is
//! moved into place until all writes succeeded, so a failed write leaves no
//! output behind. The final renames are separate filesystem operations: if
//! one of them fails, outputs renamed before it stay replaced.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::*;

/// Locations of the two output tables
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub articles: PathBuf,
    pub responses: PathBuf,
}

/// One output file and what goes into it
#[derive(Debug, Clone, Copy)]
pub enum StagedFile<'a> {
    /// Table written as CSV with a header row
    Csv { df: &'a DataFrame, target: &'a Path },
    /// Already rendered text, such as the JSON run report
    Text { contents: &'a str, target: &'a Path },
}

impl StagedFile<'_> {
    pub fn target(&self) -> &Path {
        match self {
            StagedFile::Csv { target, .. } | StagedFile::Text { target, .. } => target,
        }
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        match self {
            StagedFile::Csv { df, .. } => write_csv(df, path),
            StagedFile::Text { contents, .. } => write_text(contents, path),
        }
    }
}

/// The two output tables as staged files.
pub fn table_outputs<'a>(
    articles: &'a DataFrame,
    responses: &'a DataFrame,
    paths: &'a OutputPaths,
) -> [StagedFile<'a>; 2] {
    [
        StagedFile::Csv {
            df: articles,
            target: &paths.articles,
        },
        StagedFile::Csv {
            df: responses,
            target: &paths.responses,
        },
    ]
}

/// Write the final articles and responses tables.
pub fn write_outputs(articles: &DataFrame, responses: &DataFrame, paths: &OutputPaths) -> Result<()> {
    write_all(&table_outputs(articles, responses, paths))
}

/// Write every file to its temporary sibling, then move them all into place.
pub fn write_all(files: &[StagedFile<'_>]) -> Result<()> {
    for file in files {
        if file.target().is_dir() {
            bail!("Output path is a directory: {}", file.target().display());
        }
    }

    let mut temps: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for file in files {
        let temp = temp_path(file.target());
        if let Err(err) = file.write_to(&temp) {
            discard(&temps);
            let _ = std::fs::remove_file(&temp);
            return Err(err);
        }
        temps.push((temp, file.target()));
    }

    commit(&temps)
}

/// Move written temporaries into place. On failure the temporaries not yet
/// moved are removed.
fn commit(temps: &[(PathBuf, &Path)]) -> Result<()> {
    for (idx, (temp, target)) in temps.iter().enumerate() {
        if let Err(err) = std::fs::rename(temp, target) {
            discard(&temps[idx..]);
            return Err(err).with_context(|| format!("Failed to move {} into place", target.display()));
        }
    }
    Ok(())
}

/// Write one table as CSV with a header row, creating parent directories.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    create_parent(path)?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

fn write_text(contents: &str, path: &Path) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

fn discard(temps: &[(PathBuf, &Path)]) {
    for (temp, _) in temps {
        let _ = std::fs::remove_file(temp);
    }
}
