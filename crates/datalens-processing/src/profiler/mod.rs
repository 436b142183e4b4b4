//! Dataset profiling for the dashboard's data-overview panel.
//!
//! Profiles are descriptive only: shape, per-column dtype category, null
//! counts, cardinality, sample values, and summary statistics for numeric
//! and categorical columns. The report generator renders them before and
//! after a pipeline run so the user can see what the transforms changed.

use polars::prelude::*;
use serde::Serialize;

use crate::error::{Result, ResultExt};
use crate::utils::{
    DtypeCategory, collect_sample_values, dtype_category_str, numeric_values, population_std,
    quantile_linear, series_dtype_category, string_mode,
};

const MAX_SAMPLE_VALUES: usize = 5;

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Summary statistics for a string/categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub most_frequent: String,
    pub distinct_count: usize,
}

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    /// Coarse category used by the stages ("numeric", "string", ...)
    pub category: String,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    pub sample_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalSummary>,
}

/// Profile of an entire dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub total_missing: usize,
    pub duplicate_rows: usize,
    pub column_summaries: Vec<ColumnSummary>,
}

/// Profile every column of a dataset.
pub fn profile_dataset(df: &DataFrame) -> Result<DatasetSummary> {
    let mut column_summaries = Vec::with_capacity(df.width());
    for name in df.get_column_names() {
        column_summaries.push(profile_column(df, name.as_str())?);
    }

    let total_missing = column_summaries.iter().map(|c| c.null_count).sum();
    let duplicate_rows = df.height()
        - df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
            .height();

    Ok(DatasetSummary {
        rows: df.height(),
        columns: df.width(),
        total_missing,
        duplicate_rows,
        column_summaries,
    })
}

fn profile_column(df: &DataFrame, name: &str) -> Result<ColumnSummary> {
    let col = df
        .column(name)
        .context(format!("profiling column '{}'", name))?;
    let series = col.as_materialized_series();
    let null_count = series.null_count();
    let null_percentage = if df.height() > 0 {
        (null_count as f64 / df.height() as f64) * 100.0
    } else {
        0.0
    };
    let unique_count = series.n_unique()?;

    let numeric = match series_dtype_category(series) {
        DtypeCategory::Numeric => numeric_summary(series)?,
        _ => None,
    };
    let categorical = match series_dtype_category(series) {
        DtypeCategory::String => string_mode(series).map(|most_frequent| CategoricalSummary {
            most_frequent,
            distinct_count: unique_count - usize::from(null_count > 0),
        }),
        _ => None,
    };

    Ok(ColumnSummary {
        name: name.to_string(),
        dtype: format!("{}", series.dtype()),
        category: dtype_category_str(series).to_string(),
        null_count,
        null_percentage,
        unique_count,
        sample_values: collect_sample_values(series, MAX_SAMPLE_VALUES),
        numeric,
        categorical,
    })
}

fn numeric_summary(series: &Series) -> Result<Option<NumericSummary>> {
    let mut values = numeric_values(series)?;
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = population_std(&values).unwrap_or(0.0);
    let median = quantile_linear(&values, 0.5).unwrap_or(mean);

    Ok(Some(NumericSummary {
        mean,
        std,
        min: values[0],
        median,
        max: values[values.len() - 1],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df! {
            "age" => [Some(20.0), Some(30.0), None, Some(40.0)],
            "city" => ["NY", "LA", "NY", "SF"],
        }
        .unwrap()
    }

    #[test]
    fn test_profile_shape_and_missing() {
        let summary = profile_dataset(&sample_frame()).unwrap();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.total_missing, 1);
        assert_eq!(summary.duplicate_rows, 0);
        assert_eq!(summary.column_summaries.len(), 2);
    }

    #[test]
    fn test_numeric_column_summary() {
        let summary = profile_dataset(&sample_frame()).unwrap();
        let age = &summary.column_summaries[0];
        assert_eq!(age.name, "age");
        assert_eq!(age.category, "numeric");
        assert_eq!(age.null_count, 1);
        assert_eq!(age.null_percentage, 25.0);

        let stats = age.numeric.as_ref().unwrap();
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 40.0);
        assert_eq!(stats.median, 30.0);
    }

    #[test]
    fn test_categorical_column_summary() {
        let summary = profile_dataset(&sample_frame()).unwrap();
        let city = &summary.column_summaries[1];
        assert_eq!(city.category, "string");
        assert!(city.numeric.is_none());

        let stats = city.categorical.as_ref().unwrap();
        assert_eq!(stats.most_frequent, "NY");
        assert_eq!(stats.distinct_count, 3);
    }

    #[test]
    fn test_duplicate_rows_counted() {
        let df = df! {
            "a" => [1i64, 1, 2],
            "b" => ["x", "x", "y"],
        }
        .unwrap();
        let summary = profile_dataset(&df).unwrap();
        assert_eq!(summary.duplicate_rows, 1);
    }

    #[test]
    fn test_all_null_numeric_column() {
        let df = df! {
            "x" => [None::<f64>, None],
        }
        .unwrap();
        let summary = profile_dataset(&df).unwrap();
        assert!(summary.column_summaries[0].numeric.is_none());
        assert!(summary.column_summaries[0].sample_values.is_empty());
    }
}
