//! Outlier handling stage.
//!
//! Detection uses the IQR rule over a column's current values: anything
//! outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` is an outlier. Clipping clamps
//! to the bounds; removal filters out the offending rows. Columns are
//! processed in name order, so when several removal columns are configured
//! the later ones see the already-filtered frame.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::debug;

use crate::config::OutlierMethod;
use crate::error::Result;
use crate::types::{SkipReason, StageRecorder};
use crate::utils::{is_numeric_dtype, numeric_values, quantile_linear};

/// IQR fences for a sorted value slice.
fn iqr_bounds(sorted: &[f64]) -> Option<(f64, f64)> {
    let q1 = quantile_linear(sorted, 0.25)?;
    let q3 = quantile_linear(sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
}

pub(crate) fn apply(
    df: &mut DataFrame,
    config: &BTreeMap<String, OutlierMethod>,
    rec: &mut StageRecorder,
) -> Result<()> {
    for (column, method) in config {
        let Ok(col) = df.column(column.as_str()) else {
            rec.skipped(column, SkipReason::ColumnMissing);
            continue;
        };
        let series = col.as_materialized_series().clone();

        if !is_numeric_dtype(series.dtype()) {
            rec.skipped(column, SkipReason::NotNumeric);
            continue;
        }

        let mut values = numeric_values(&series)?;
        if values.is_empty() {
            rec.skipped(column, SkipReason::EmptyColumn);
            continue;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let Some((lower, upper)) = iqr_bounds(&values) else {
            rec.skipped(column, SkipReason::EmptyColumn);
            continue;
        };

        let cast = series.cast(&DataType::Float64)?;
        let chunked = cast.f64()?;

        match method {
            OutlierMethod::Clip => {
                let clipped_count = chunked
                    .into_iter()
                    .flatten()
                    .filter(|v| *v < lower || *v > upper)
                    .count();
                let clipped = chunked.apply(|v| v.map(|x| x.clamp(lower, upper)));
                let mut out = clipped.into_series();
                out.rename(series.name().clone());
                df.replace(column, out)?;
                debug!(column = %column, lower, upper, clipped_count, "clipped outliers");
                rec.applied(
                    column,
                    format!(
                        "Clipped {} values in '{}' to [{:.2}, {:.2}]",
                        clipped_count, column, lower, upper
                    ),
                );
            }
            OutlierMethod::Remove => {
                // Null entries are not outliers; keep them.
                let keep: Vec<bool> = chunked
                    .into_iter()
                    .map(|v| v.map(|x| x >= lower && x <= upper).unwrap_or(true))
                    .collect();
                let mask = BooleanChunked::from_slice("mask".into(), &keep);
                let before = df.height();
                *df = df.filter(&mask)?;
                let removed = before - df.height();
                debug!(column = %column, lower, upper, removed, "removed outlier rows");
                rec.applied(
                    column,
                    format!(
                        "Removed {} outlier rows from '{}' (bounds [{:.2}, {:.2}])",
                        removed, column, lower, upper
                    ),
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;

    fn rec() -> StageRecorder {
        StageRecorder::new(Stage::HandleOutliers)
    }

    fn config_of(column: &str, method: OutlierMethod) -> BTreeMap<String, OutlierMethod> {
        let mut config = BTreeMap::new();
        config.insert(column.to_string(), method);
        config
    }

    #[test]
    fn test_iqr_bounds_reference_vector() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let (lower, upper) = iqr_bounds(&sorted).unwrap();
        assert!((lower - (-1.5)).abs() < 1e-12);
        assert!((upper - 8.5).abs() < 1e-12);
    }

    #[test]
    fn test_clip_clamps_to_upper_bound() {
        let mut df = df! {
            "x" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
        }
        .unwrap();
        apply(&mut df, &config_of("x", OutlierMethod::Clip), &mut rec()).unwrap();

        assert_eq!(df.height(), 6);
        let x = df.column("x").unwrap();
        let last = x.get(5).unwrap().try_extract::<f64>().unwrap();
        assert!((last - 8.5).abs() < 1e-12);
        // in-bounds values are untouched
        assert_eq!(x.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
    }

    #[test]
    fn test_remove_drops_outlier_rows() {
        let mut df = df! {
            "x" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
            "tag" => ["a", "b", "c", "d", "e", "f"],
        }
        .unwrap();
        apply(&mut df, &config_of("x", OutlierMethod::Remove), &mut rec()).unwrap();

        assert_eq!(df.height(), 5);
        // the companion column shrank in lockstep
        assert_eq!(df.column("tag").unwrap().len(), 5);
    }

    #[test]
    fn test_remove_keeps_null_rows() {
        let mut df = df! {
            "x" => [Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(100.0)],
        }
        .unwrap();
        apply(&mut df, &config_of("x", OutlierMethod::Remove), &mut rec()).unwrap();

        assert_eq!(df.height(), 6);
        assert_eq!(df.column("x").unwrap().null_count(), 1);
    }

    #[test]
    fn test_sequential_remove_uses_filtered_frame() {
        // Removing 'a' outliers drops the row carrying b = 1000. On the
        // full frame b's fences would be [-10.5, 47.5] and keep the 30;
        // recomputed on the filtered frame they tighten to [8, 16] and
        // remove it. Name order puts 'a' first.
        let mut df = df! {
            "a" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
            "b" => [10.0, 11.0, 12.0, 13.0, 30.0, 1000.0],
        }
        .unwrap();
        let mut config = BTreeMap::new();
        config.insert("a".to_string(), OutlierMethod::Remove);
        config.insert("b".to_string(), OutlierMethod::Remove);
        apply(&mut df, &config, &mut rec()).unwrap();

        assert_eq!(df.height(), 4);
        let b = df.column("b").unwrap();
        let values: Vec<f64> = (0..df.height())
            .map(|i| b.get(i).unwrap().try_extract::<f64>().unwrap())
            .collect();
        assert_eq!(values, vec![10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_non_numeric_column_is_a_skip() {
        let mut df = df! {
            "name" => ["a", "b", "c"],
        }
        .unwrap();
        let mut recorder = rec();
        apply(&mut df, &config_of("name", OutlierMethod::Clip), &mut recorder).unwrap();
        assert!(!recorder.any_applied());
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_uniform_column_is_untouched() {
        // IQR is zero, so the fences collapse onto the single value
        let mut df = df! {
            "x" => [7.0, 7.0, 7.0, 7.0],
        }
        .unwrap();
        apply(&mut df, &config_of("x", OutlierMethod::Remove), &mut rec()).unwrap();
        assert_eq!(df.height(), 4);
    }
}
