//! Categorical encoding stage.
//!
//! One-hot encoding appends one 0/1 indicator column per distinct category
//! and removes the source column; rows that are null in the source get all
//! zeros. Label encoding replaces the column in place with integer codes
//! assigned in lexicographic category order, nulls becoming -1. Category
//! order is sorted in both cases, so the derived schema does not depend on
//! row order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use polars::prelude::*;
use tracing::debug;

use crate::config::EncodingMethod;
use crate::error::Result;
use crate::types::{SkipReason, StageRecorder};
use crate::utils::{DtypeCategory, series_dtype_category};

pub(crate) fn apply(
    df: &mut DataFrame,
    config: &BTreeMap<String, EncodingMethod>,
    rec: &mut StageRecorder,
) -> Result<()> {
    for (column, method) in config {
        let Ok(col) = df.column(column.as_str()) else {
            rec.skipped(column, SkipReason::ColumnMissing);
            continue;
        };
        let series = col.as_materialized_series().clone();

        if series_dtype_category(&series) != DtypeCategory::String {
            rec.skipped(column, SkipReason::NotCategorical);
            continue;
        }
        let cast = series.cast(&DataType::String)?;
        let chunked = cast.str()?;

        let categories: BTreeSet<&str> = chunked.into_iter().flatten().collect();
        if categories.is_empty() {
            rec.skipped(column, SkipReason::EmptyColumn);
            continue;
        }

        match method {
            EncodingMethod::Onehot => {
                for category in &categories {
                    let name = format!("{}_{}", column, category);
                    let vals: Vec<u32> = chunked
                        .into_iter()
                        .map(|v| (v == Some(*category)) as u32)
                        .collect();
                    df.with_column(Series::new(name.as_str().into(), vals))?;
                }
                df.drop_in_place(column)?;
                debug!(column = %column, categories = categories.len(), "one-hot encoded");
                rec.applied(
                    column,
                    format!(
                        "One-hot encoded '{}' into {} columns",
                        column,
                        categories.len()
                    ),
                );
            }
            EncodingMethod::Label => {
                let codes_by_category: HashMap<&str, i32> = categories
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (*c, i as i32))
                    .collect();
                let codes: Vec<i32> = chunked
                    .into_iter()
                    .map(|v| v.map(|s| codes_by_category[s]).unwrap_or(-1))
                    .collect();
                df.replace(column, Series::new(series.name().clone(), codes))?;
                debug!(column = %column, categories = categories.len(), "label encoded");
                rec.applied(
                    column,
                    format!(
                        "Label encoded '{}' ({} categories)",
                        column,
                        categories.len()
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
        StageRecorder::new(Stage::Encoding)
    }

    fn config_of(column: &str, method: EncodingMethod) -> BTreeMap<String, EncodingMethod> {
        let mut config = BTreeMap::new();
        config.insert(column.to_string(), method);
        config
    }

    #[test]
    fn test_onehot_expands_and_removes_source() {
        let mut df = df! {
            "color" => ["red", "blue", "red"],
            "x" => [1.0, 2.0, 3.0],
        }
        .unwrap();
        apply(&mut df, &config_of("color", EncodingMethod::Onehot), &mut rec()).unwrap();

        assert!(df.column("color").is_err());
        let get = |name: &str, i: usize| {
            df.column(name).unwrap().get(i).unwrap().try_extract::<u32>().unwrap()
        };
        assert_eq!(get("color_red", 0), 1);
        assert_eq!(get("color_blue", 0), 0);
        assert_eq!(get("color_blue", 1), 1);
        // each row sums to exactly one across the indicator columns
        for i in 0..3 {
            assert_eq!(get("color_red", i) + get("color_blue", i), 1);
        }
    }

    #[test]
    fn test_onehot_null_row_is_all_zeros() {
        let mut df = df! {
            "color" => [Some("red"), None, Some("blue")],
        }
        .unwrap();
        apply(&mut df, &config_of("color", EncodingMethod::Onehot), &mut rec()).unwrap();

        let get = |name: &str, i: usize| {
            df.column(name).unwrap().get(i).unwrap().try_extract::<u32>().unwrap()
        };
        assert_eq!(get("color_red", 1) + get("color_blue", 1), 0);
    }

    #[test]
    fn test_label_codes_are_lexicographic() {
        let mut df = df! {
            "city" => [Some("NY"), Some("LA"), None, Some("SF")],
        }
        .unwrap();
        apply(&mut df, &config_of("city", EncodingMethod::Label), &mut rec()).unwrap();

        let city = df.column("city").unwrap();
        let get = |i: usize| city.get(i).unwrap().try_extract::<i32>().unwrap();
        // sorted categories: LA = 0, NY = 1, SF = 2
        assert_eq!(get(0), 1);
        assert_eq!(get(1), 0);
        assert_eq!(get(2), -1); // null
        assert_eq!(get(3), 2);
    }

    #[test]
    fn test_numeric_column_is_a_skip() {
        let mut df = df! {
            "x" => [1.0, 2.0],
        }
        .unwrap();
        let mut recorder = rec();
        apply(&mut df, &config_of("x", EncodingMethod::Onehot), &mut recorder).unwrap();

        assert!(!recorder.any_applied());
        assert!(df.column("x").is_ok());
    }

    #[test]
    fn test_all_null_column_is_a_skip() {
        let mut df = df! {
            "city" => [None::<&str>, None],
        }
        .unwrap();
        let mut recorder = rec();
        apply(&mut df, &config_of("city", EncodingMethod::Label), &mut recorder).unwrap();
        assert!(!recorder.any_applied());
    }
}
