//! Small DataFrame helpers shared by the pipeline stages

use std::collections::HashSet;

use polars::prelude::*;

/// Cast the named columns in place, keeping their names.
pub fn cast_columns(df: &mut DataFrame, columns: &[&str], dtype: &DataType) -> PolarsResult<()> {
    for name in columns {
        let cast = df.column(name)?.cast(dtype)?;
        df.with_column(cast)?;
    }
    Ok(())
}

/// Keep the rows whose key passes `keep`.
pub fn retain_rows<F>(df: &DataFrame, key: &str, mut keep: F) -> PolarsResult<DataFrame>
where
    F: FnMut(Option<&str>) -> bool,
{
    let mask: BooleanChunked = df
        .column(key)?
        .str()?
        .into_iter()
        .map(|k| keep(k))
        .collect();
    df.filter(&mask)
}

/// Keep the first row for every non-null key, in table order. Rows with a
/// null key are dropped.
pub fn first_per_key(df: &DataFrame, key: &str) -> PolarsResult<DataFrame> {
    let keys = df.column(key)?.str()?;
    let mut seen: HashSet<&str> = HashSet::with_capacity(keys.len());
    let mask: BooleanChunked = keys
        .into_iter()
        .map(|k| k.is_some_and(|k| seen.insert(k)))
        .collect();
    df.filter(&mask)
}

/// The first repeated non-null key, if any.
pub fn find_duplicate_key(df: &DataFrame, key: &str) -> PolarsResult<Option<String>> {
    let keys = df.column(key)?.str()?;
    let mut seen: HashSet<&str> = HashSet::with_capacity(keys.len());
    Ok(keys
        .into_iter()
        .flatten()
        .find(|k| !seen.insert(k))
        .map(str::to_string))
}

/// The set of non-null values of a string column.
pub fn key_set(df: &DataFrame, key: &str) -> PolarsResult<HashSet<String>> {
    Ok(df
        .column(key)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Number of non-null, non-zero values in a numeric column.
pub fn count_nonzero(df: &DataFrame, column: &str) -> PolarsResult<usize> {
    let values = df.column(column)?.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .filter(|v| matches!(v, Some(x) if *x != 0.0))
        .count())
}

/// Number of rows where at least one of `columns` is non-null.
pub fn count_any_present(df: &DataFrame, columns: &[&str]) -> PolarsResult<usize> {
    let mut present = vec![false; df.height()];
    for name in columns {
        let column = df.column(name)?;
        for (idx, flag) in present.iter_mut().enumerate() {
            if !column.get(idx)?.is_null() {
                *flag = true;
            }
        }
    }
    Ok(present.into_iter().filter(|p| *p).count())
}
