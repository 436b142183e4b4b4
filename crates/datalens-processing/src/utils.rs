//! Shared utilities for the preprocessing pipeline.
//!
//! Common helpers used across the pipeline stages: dtype classification,
//! deterministic statistics, and series fill/collection routines.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category of a Series.
pub fn series_dtype_category(series: &Series) -> DtypeCategory {
    get_dtype_category(series.dtype())
}

/// Get the dtype category as a display string.
pub fn dtype_category_str(series: &Series) -> &'static str {
    match series_dtype_category(series) {
        DtypeCategory::Numeric => "numeric",
        DtypeCategory::Datetime => "datetime",
        DtypeCategory::Boolean => "boolean",
        DtypeCategory::String => "string",
        DtypeCategory::Other => "other",
    }
}

// =============================================================================
// Deterministic Statistics
// =============================================================================

/// Collect the non-null values of a numeric Series as f64, in row order.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let cast = series.cast(&DataType::Float64)?;
    let chunked = cast.f64()?;
    Ok(chunked.into_iter().flatten().collect())
}

/// Linear-interpolation quantile over an ascending-sorted slice.
///
/// Matches the convention of pandas `quantile` / numpy `percentile`
/// (position `(n - 1) * q`, interpolated between neighbors), which the
/// IQR outlier bounds and robust scaling rely on.
pub fn quantile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    if n == 1 {
        return Some(sorted[0]);
    }
    let pos = (n - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let frac = pos - lower as f64;
    Some(sorted[lower] + frac * (sorted[upper] - sorted[lower]))
}

/// Population standard deviation (ddof = 0), the scaler convention.
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(var.sqrt())
}

/// Calculate the mode of a string Series.
///
/// Ties break to the value whose first occurrence comes earliest in row
/// order, keeping repeated runs deterministic.
pub fn string_mode(series: &Series) -> Option<String> {
    let str_series = series.cast(&DataType::String).ok()?;
    let chunked = str_series.str().ok()?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for val in chunked.into_iter().flatten() {
        let entry = counts.entry(val.to_string()).or_insert(0);
        if *entry == 0 {
            order.push(val.to_string());
        }
        *entry += 1;
    }

    let mut best: Option<(&String, usize)> = None;
    for val in &order {
        let count = counts[val];
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.clone())
}

/// Calculate the mode of a numeric Series with the same first-seen tie-break.
pub fn numeric_mode(series: &Series) -> Option<f64> {
    let values = numeric_values(series).ok()?;
    if values.is_empty() {
        return None;
    }

    let mut order: Vec<u64> = Vec::new();
    let mut counts: std::collections::HashMap<u64, (f64, usize)> =
        std::collections::HashMap::new();
    for v in values {
        let key = v.to_bits();
        let entry = counts.entry(key).or_insert((v, 0));
        if entry.1 == 0 {
            order.push(key);
        }
        entry.1 += 1;
    }

    let mut best: Option<(f64, usize)> = None;
    for key in &order {
        let (val, count) = counts[key];
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let cast = series.cast(&DataType::Float64)?;
    let chunked = cast.f64()?;
    let filled = chunked.apply(|v| Some(v.unwrap_or(fill_value)));
    let mut out = filled.into_series();
    out.rename(series.name().clone());
    Ok(out)
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let cast = series.cast(&DataType::String)?;
    let chunked = cast.str()?;
    let result_vec: Vec<Option<String>> = chunked
        .into_iter()
        .map(|v| Some(v.map(|s| s.to_string()).unwrap_or_else(|| fill_value.to_string())))
        .collect();
    Ok(Series::new(series.name().clone(), result_vec))
}

/// Collect sample values from a Series (non-null values only).
pub fn collect_sample_values(series: &Series, max_samples: usize) -> Vec<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Vec::new();
    }

    let sample_size = std::cmp::min(max_samples, non_null.len());
    let mut samples = Vec::with_capacity(sample_size);
    for i in 0..sample_size {
        if let Ok(val) = non_null.get(i) {
            samples.push(format!("{}", val));
        }
    }
    samples
}

// =============================================================================
// Tests
// =============================================================================
