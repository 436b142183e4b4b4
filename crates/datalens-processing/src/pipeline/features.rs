//! Feature engineering stage.
//!
//! Derived columns are appended to the frame; source columns are never
//! modified. Three families are supported: date-time component extraction,
//! equal-width binning, and text-derived features.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use crate::config::{DateComponent, DerivedFeature, TextFeature};
use crate::error::Result;
use crate::types::{SkipReason, StageRecorder};
use crate::utils::{is_numeric_dtype, numeric_values};

pub(crate) fn apply(
    df: &mut DataFrame,
    config: &BTreeMap<String, Vec<DerivedFeature>>,
    rec: &mut StageRecorder,
) -> Result<()> {
    for (column, features) in config {
        for feature in features {
            if df.column(column.as_str()).is_err() {
                rec.skipped(column, SkipReason::ColumnMissing);
                continue;
            }
            match feature {
                DerivedFeature::DatetimeFeatures(components) => {
                    datetime_features(df, column, components, rec)?
                }
                DerivedFeature::Binning { n_bins, labels } => {
                    binning(df, column, *n_bins, labels.as_deref(), rec)?
                }
                DerivedFeature::TextFeatures(requests) => {
                    text_features(df, column, requests, rec)?
                }
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Date-time components
// -----------------------------------------------------------------------------

fn datetime_features(
    df: &mut DataFrame,
    column: &str,
    components: &[DateComponent],
    rec: &mut StageRecorder,
) -> Result<()> {
    let series = df.column(column)?.as_materialized_series().clone();

    let stamps: Vec<Option<NaiveDateTime>> = match series.dtype() {
        DataType::Date => series
            .date()?
            .as_date_iter()
            .map(|d| d.and_then(|d| d.and_hms_opt(0, 0, 0)))
            .collect(),
        DataType::Datetime(_, _) => series.datetime()?.as_datetime_iter().collect(),
        _ => {
            rec.skipped(column, SkipReason::NotDatetime);
            return Ok(());
        }
    };

    for component in components {
        let name = format!("{}_{}", column, component.suffix());
        let values: Vec<Option<i32>> = stamps
            .iter()
            .map(|stamp| stamp.map(|dt| extract_component(&dt, *component)))
            .collect();
        df.with_column(Series::new(name.as_str().into(), values))?;
        debug!(column = %column, derived = %name, "extracted date component");
        rec.applied(column, format!("Extracted '{}' from '{}'", name, column));
    }
    Ok(())
}

fn extract_component(dt: &NaiveDateTime, component: DateComponent) -> i32 {
    match component {
        DateComponent::Year => dt.year(),
        DateComponent::Month => dt.month() as i32,
        DateComponent::Day => dt.day() as i32,
        // Monday = 0 .. Sunday = 6
        DateComponent::Weekday => dt.weekday().num_days_from_monday() as i32,
        DateComponent::Quarter => ((dt.month() - 1) / 3 + 1) as i32,
        DateComponent::IsWeekend => (dt.weekday().num_days_from_monday() >= 5) as i32,
    }
}

// -----------------------------------------------------------------------------
// Equal-width binning
// -----------------------------------------------------------------------------

fn binning(
    df: &mut DataFrame,
    column: &str,
    n_bins: usize,
    labels: Option<&[String]>,
    rec: &mut StageRecorder,
) -> Result<()> {
    let series = df.column(column)?.as_materialized_series().clone();

    if !is_numeric_dtype(series.dtype()) {
        rec.skipped(column, SkipReason::NotNumeric);
        return Ok(());
    }
    let values = numeric_values(&series)?;
    if values.is_empty() {
        rec.skipped(column, SkipReason::EmptyColumn);
        return Ok(());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / n_bins as f64;

    // Right-closed bins; the minimum lands in bin 0.
    let bin_index = |x: f64| -> usize {
        if width == 0.0 || x <= min {
            0
        } else {
            let raw = ((x - min) / width).ceil() as usize;
            raw.saturating_sub(1).min(n_bins - 1)
        }
    };

    let cast = series.cast(&DataType::Float64)?;
    let chunked = cast.f64()?;
    let name = format!("{}_bin", column);

    let binned: Series = match labels {
        Some(labels) => {
            let vals: Vec<Option<&str>> = chunked
                .into_iter()
                .map(|v| v.map(|x| labels[bin_index(x)].as_str()))
                .collect();
            Series::new(name.as_str().into(), vals)
        }
        None => {
            let vals: Vec<Option<u32>> = chunked
                .into_iter()
                .map(|v| v.map(|x| bin_index(x) as u32))
                .collect();
            Series::new(name.as_str().into(), vals)
        }
    };

    df.with_column(binned)?;
    debug!(column = %column, n_bins, "binned column");
    rec.applied(
        column,
        format!("Created {} bins for '{}' as '{}'", n_bins, column, name),
    );
    Ok(())
}

// -----------------------------------------------------------------------------
// Text features
// -----------------------------------------------------------------------------

fn text_features(
    df: &mut DataFrame,
    column: &str,
    requests: &[TextFeature],
    rec: &mut StageRecorder,
) -> Result<()> {
    let series = df.column(column)?.as_materialized_series().clone();

    if !matches!(series.dtype(), DataType::String) {
        rec.skipped(column, SkipReason::NotText);
        return Ok(());
    }
    let chunked = series.str()?;

    for request in requests {
        match request {
            TextFeature::Length => {
                let name = format!("{}_length", column);
                let vals: Vec<Option<u32>> = chunked
                    .into_iter()
                    .map(|v| v.map(|s| s.chars().count() as u32))
                    .collect();
                df.with_column(Series::new(name.as_str().into(), vals))?;
                rec.applied(column, format!("Added character count '{}'", name));
            }
            TextFeature::WordCount => {
                let name = format!("{}_word_count", column);
                let vals: Vec<Option<u32>> = chunked
                    .into_iter()
                    .map(|v| v.map(|s| s.split_whitespace().count() as u32))
                    .collect();
                df.with_column(Series::new(name.as_str().into(), vals))?;
                rec.applied(column, format!("Added word count '{}'", name));
            }
            TextFeature::Contains(terms) => {
                for term in terms {
                    let name = format!("{}_contains_{}", column, term);
                    let needle = term.to_lowercase();
                    let vals: Vec<Option<u32>> = chunked
                        .into_iter()
                        .map(|v| v.map(|s| s.to_lowercase().contains(&needle) as u32))
                        .collect();
                    df.with_column(Series::new(name.as_str().into(), vals))?;
                    rec.applied(column, format!("Added containment flag '{}'", name));
                }
            }
        }
    }
    Ok(())
}
