//! Numeric scaling stage.
//!
//! One method is applied to a set of target columns: the configured list,
//! or every numeric column when the list is empty. Scaled columns become
//! Float64; nulls pass through unchanged. A degenerate spread (zero std,
//! zero range, zero IQR) maps every non-null value to 0 rather than
//! dividing by zero.

use polars::prelude::*;
use tracing::debug;

use crate::config::{ScalingConfig, ScalingMethod};
use crate::error::Result;
use crate::types::{SkipReason, StageRecorder};
use crate::utils::{is_numeric_dtype, numeric_values, population_std, quantile_linear};

fn method_label(method: ScalingMethod) -> &'static str {
    match method {
        ScalingMethod::Standard => "standard",
        ScalingMethod::Minmax => "min-max",
        ScalingMethod::Robust => "robust",
    }
}

/// `(offset, scale)` so that the transform is `(x - offset) / scale`.
/// A zero scale signals a degenerate column.
fn scaling_params(method: ScalingMethod, values: &[f64]) -> Option<(f64, f64)> {
    match method {
        ScalingMethod::Standard => {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = population_std(values)?;
            Some((mean, std))
        }
        ScalingMethod::Minmax => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some((min, max - min))
        }
        ScalingMethod::Robust => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let median = quantile_linear(&sorted, 0.5)?;
            let q1 = quantile_linear(&sorted, 0.25)?;
            let q3 = quantile_linear(&sorted, 0.75)?;
            Some((median, q3 - q1))
        }
    }
}

pub(crate) fn apply(
    df: &mut DataFrame,
    config: &ScalingConfig,
    rec: &mut StageRecorder,
) -> Result<()> {
    let targets: Vec<String> = if config.columns.is_empty() {
        df.get_columns()
            .iter()
            .filter(|c| is_numeric_dtype(c.dtype()))
            .map(|c| c.name().to_string())
            .collect()
    } else {
        config.columns.clone()
    };

    for column in &targets {
        let Ok(col) = df.column(column.as_str()) else {
            rec.skipped(column, SkipReason::ColumnMissing);
            continue;
        };
        let series = col.as_materialized_series().clone();

        if !is_numeric_dtype(series.dtype()) {
            rec.skipped(column, SkipReason::NotNumeric);
            continue;
        }
        let values = numeric_values(&series)?;
        if values.is_empty() {
            rec.skipped(column, SkipReason::EmptyColumn);
            continue;
        }
        let Some((offset, scale)) = scaling_params(config.method, &values) else {
            rec.skipped(column, SkipReason::EmptyColumn);
            continue;
        };

        let cast = series.cast(&DataType::Float64)?;
        let chunked = cast.f64()?;
        let scaled = chunked.apply(|v| {
            v.map(|x| if scale == 0.0 { 0.0 } else { (x - offset) / scale })
        });
        let mut out = scaled.into_series();
        out.rename(series.name().clone());
        df.replace(column, out)?;

        debug!(column = %column, method = method_label(config.method), "scaled column");
        rec.applied(
            column,
            format!("Applied {} scaling to '{}'", method_label(config.method), column),
        );
    }
    Ok(())
}
