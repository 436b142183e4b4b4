//! Missing-value handling stage.
//!
//! Per-column strategies: drop the affected rows, fill with a column
//! statistic (mean, median, mode), fill with zero, or propagate the
//! nearest non-missing neighbor (forward/backward). Statistic fills are
//! numeric-only except mode, which also covers string columns.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::debug;

use crate::config::MissingMethod;
use crate::error::Result;
use crate::types::{SkipReason, StageRecorder};
use crate::utils::{
    self, DtypeCategory, fill_numeric_nulls, fill_string_nulls, series_dtype_category,
};

pub(crate) fn apply(
    df: &mut DataFrame,
    config: &BTreeMap<String, MissingMethod>,
    rec: &mut StageRecorder,
) -> Result<()> {
    for (column, method) in config {
        let Ok(col) = df.column(column.as_str()) else {
            rec.skipped(column, SkipReason::ColumnMissing);
            continue;
        };
        let series = col.as_materialized_series().clone();

        if series.null_count() == 0 {
            rec.skipped(column, SkipReason::NoMissingValues);
            continue;
        }

        match method {
            MissingMethod::Drop => {
                let removed = series.null_count();
                let mask = series.is_not_null();
                *df = df.filter(&mask)?;
                debug!(column = %column, removed, "dropped rows with missing values");
                rec.applied(
                    column,
                    format!("Dropped {} rows with missing '{}'", removed, column),
                );
            }
            MissingMethod::Mean => {
                if series_dtype_category(&series) != DtypeCategory::Numeric {
                    rec.skipped(column, SkipReason::NotNumeric);
                    continue;
                }
                let Some(mean) = series.mean() else {
                    rec.skipped(column, SkipReason::EmptyColumn);
                    continue;
                };
                df.replace(column, fill_numeric_nulls(&series, mean)?)?;
                rec.applied(column, format!("Filled '{}' with mean: {:.2}", column, mean));
            }
            MissingMethod::Median => {
                if series_dtype_category(&series) != DtypeCategory::Numeric {
                    rec.skipped(column, SkipReason::NotNumeric);
                    continue;
                }
                let Some(median) = series.median() else {
                    rec.skipped(column, SkipReason::EmptyColumn);
                    continue;
                };
                df.replace(column, fill_numeric_nulls(&series, median)?)?;
                rec.applied(
                    column,
                    format!("Filled '{}' with median: {:.2}", column, median),
                );
            }
            MissingMethod::Mode => match series_dtype_category(&series) {
                DtypeCategory::Numeric => {
                    let Some(mode) = utils::numeric_mode(&series) else {
                        rec.skipped(column, SkipReason::EmptyColumn);
                        continue;
                    };
                    df.replace(column, fill_numeric_nulls(&series, mode)?)?;
                    rec.applied(column, format!("Filled '{}' with mode: {}", column, mode));
                }
                DtypeCategory::String => {
                    let Some(mode) = utils::string_mode(&series) else {
                        rec.skipped(column, SkipReason::EmptyColumn);
                        continue;
                    };
                    df.replace(column, fill_string_nulls(&series, &mode)?)?;
                    rec.applied(column, format!("Filled '{}' with mode: '{}'", column, mode));
                }
                _ => rec.skipped(column, SkipReason::NotCategorical),
            },
            MissingMethod::Zero => {
                if series_dtype_category(&series) != DtypeCategory::Numeric {
                    rec.skipped(column, SkipReason::NotNumeric);
                    continue;
                }
                df.replace(column, fill_numeric_nulls(&series, 0.0)?)?;
                rec.applied(column, format!("Filled '{}' with zero", column));
            }
            MissingMethod::Forward => {
                let filled = series.fill_null(FillNullStrategy::Forward(None))?;
                df.replace(column, filled)?;
                rec.applied(column, format!("Forward-filled '{}'", column));
            }
            MissingMethod::Backward => {
                let filled = series.fill_null(FillNullStrategy::Backward(None))?;
                df.replace(column, filled)?;
                rec.applied(column, format!("Backward-filled '{}'", column));
            }
        }
    }
    Ok(())
}
