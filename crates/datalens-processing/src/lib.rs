//! DataLens Preprocessing Library
//!
//! Configuration-driven tabular preprocessing built with Rust and Polars,
//! serving as the transform engine behind the DataLens exploration
//! dashboard.
//!
//! # Overview
//!
//! A [`Pipeline`] takes a declarative [`TransformConfig`] and applies it to
//! a `DataFrame` in a fixed stage order:
//!
//! - **Missing values**: drop rows, statistic fills, forward/backward fill
//! - **Outliers**: IQR-based clipping or row removal
//! - **Scaling**: standard, min-max, or robust scaling of numeric columns
//! - **Feature engineering**: date components, equal-width binning, text features
//! - **Encoding**: one-hot or label encoding of categorical columns
//! - **Column dropping**: removal of unwanted columns, always last
//!
//! Stages are best-effort per column: a transform that does not fit a
//! column (wrong type, column absent, nothing to do) is skipped and
//! reported in the outcome's diagnostics rather than failing the run. Only
//! a malformed configuration is an error.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datalens_processing::{Pipeline, TransformConfig};
//! use datalens_processing::config::{MissingMethod, ScalingMethod, EncodingMethod};
//! use polars::prelude::*;
//!
//! let df = CsvReader::from_path("data.csv")?.finish()?;
//!
//! let config = TransformConfig::default()
//!     .with_missing("age", MissingMethod::Median)
//!     .with_scaling(ScalingMethod::Minmax, vec![])
//!     .with_encoding("city", EncodingMethod::Onehot);
//!
//! let outcome = Pipeline::new(config)?.apply(&df)?;
//! println!("{} -> {} rows", outcome.rows_before, outcome.data.height());
//! for skip in outcome.skips() {
//!     println!("skipped {} on '{}'", skip.stage, skip.column);
//! }
//! ```
//!
//! Configurations can also be parsed from the JSON documents the dashboard
//! frontend assembles:
//!
//! ```rust,ignore
//! let pipeline = Pipeline::from_json(r#"{
//!     "handle_missing": {"age": "median"},
//!     "encoding": {"city": "onehot"}
//! }"#)?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod sample;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    DateComponent, DerivedFeature, EncodingMethod, MissingMethod, OutlierMethod, ScalingConfig,
    ScalingMethod, TextFeature, TransformConfig,
};
pub use error::{PipelineError, Result, ResultExt};
pub use pipeline::Pipeline;
pub use profiler::{ColumnSummary, DatasetSummary, profile_dataset};
pub use reporting::{ProcessingReport, ReportGenerator};
pub use sample::SampleDataset;
pub use types::{AppliedStage, ApplyOutcome, ColumnOutcome, OutcomeStatus, SkipReason, Stage};
pub use utils::{
    DtypeCategory, dtype_category_str, fill_numeric_nulls, fill_string_nulls, get_dtype_category,
    is_datetime_dtype, is_numeric_dtype,
};
