//! Configuration types for the preprocessing pipeline.
//!
//! A [`TransformConfig`] is a pure, declarative description of the transforms
//! to apply. Stage parameters are typed enums rather than open-ended string
//! maps, so unknown methods are rejected when the configuration is built or
//! deserialized, and unsupported column/method combinations reduce to
//! explicit skip branches inside the stages.
//!
//! The serialized tokens (`"mean"`, `"clip"`, `"minmax"`, `"onehot"`, ...)
//! match the dashboard frontend's configuration dictionaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};

/// Method for handling missing values in a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMethod {
    /// Remove every row where this column is missing
    Drop,
    /// Fill with the column mean (numeric only)
    Mean,
    /// Fill with the column median (numeric only)
    Median,
    /// Fill with the most frequent value (first observed among ties)
    Mode,
    /// Fill with numeric zero (numeric only)
    Zero,
    /// Fill with the nearest preceding non-missing value
    Forward,
    /// Fill with the nearest following non-missing value
    Backward,
}

/// Method for handling outliers in a single numeric column.
///
/// Bounds are the Tukey fences: `Q1 - 1.5*IQR` and `Q3 + 1.5*IQR`, computed
/// over the column's current (post-imputation) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Clamp values to the IQR bounds
    Clip,
    /// Remove rows whose value falls outside the IQR bounds
    Remove,
}

/// Scaling method applied to a set of numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// `(x - mean) / std`, population std (ddof = 0)
    Standard,
    /// `(x - min) / (max - min)`; degenerate range maps to 0
    Minmax,
    /// `(x - median) / IQR`; zero IQR maps to 0
    Robust,
}

/// Scaling stage parameters: one method for a selected column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub method: ScalingMethod,
    /// Columns to rescale. Empty means "all numeric columns".
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Date-time component that can be extracted into a derived column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateComponent {
    Year,
    /// Month of year, 1-12
    Month,
    /// Day of month
    Day,
    /// Day of week, Monday = 0
    Weekday,
    /// Calendar quarter, 1-4
    Quarter,
    /// Whether the day is Saturday or Sunday
    IsWeekend,
}

impl DateComponent {
    /// Suffix used for the derived column name (`<col>_<suffix>`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Weekday => "weekday",
            Self::Quarter => "quarter",
            Self::IsWeekend => "is_weekend",
        }
    }
}

/// Text feature that can be derived from a string column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFeature {
    /// Character count, appended as `<col>_length`
    Length,
    /// Whitespace-token count, appended as `<col>_word_count`
    WordCount,
    /// Case-insensitive containment flags, one `<col>_contains_<term>`
    /// column per search term
    Contains(Vec<String>),
}

/// One derived-feature request for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFeature {
    /// Extract date-time components (date/datetime columns only)
    DatetimeFeatures(Vec<DateComponent>),
    /// Equal-width binning over `[min, max]` (numeric columns only)
    Binning {
        n_bins: usize,
        /// Optional labels, one per bin; without labels the bin column
        /// holds zero-based bin indices
        #[serde(default)]
        labels: Option<Vec<String>>,
    },
    /// Text-derived features (string columns only)
    TextFeatures(Vec<TextFeature>),
}

/// Categorical encoding method for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMethod {
    /// One 0/1 indicator column per distinct category; original column removed
    Onehot,
    /// Integer codes per distinct category, assigned in lexicographic order
    Label,
}

/// Declarative configuration for one pipeline run.
///
/// Stages execute in a fixed order regardless of construction order:
/// missing values, outliers, scaling, feature engineering, encoding,
/// column dropping. Absent stages are no-ops. Column maps are `BTreeMap`s,
/// so within a stage columns are processed in name order, which pins the
/// row-removal ordering sensitivity and makes repeated runs bit-identical.
///
/// # Example
///
/// ```rust,ignore
/// use datalens_processing::config::*;
///
/// let config = TransformConfig::default()
///     .with_missing("age", MissingMethod::Median)
///     .with_outliers("income", OutlierMethod::Clip)
///     .with_scaling(ScalingMethod::Minmax, vec!["age".into(), "income".into()])
///     .with_encoding("city", EncodingMethod::Onehot);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Column name -> missing-value method
    pub handle_missing: BTreeMap<String, MissingMethod>,
    /// Column name -> outlier method
    pub handle_outliers: BTreeMap<String, OutlierMethod>,
    /// Scaling method plus target columns
    pub scaling: Option<ScalingConfig>,
    /// Column name -> requested derived features
    pub feature_engineering: BTreeMap<String, Vec<DerivedFeature>>,
    /// Column name -> encoding method
    pub encoding: BTreeMap<String, EncodingMethod>,
    /// Columns to remove after all other stages
    pub drop_columns: Vec<String>,
}

impl TransformConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Unknown stage names or method tokens are rejected with
    /// [`PipelineError::InvalidConfig`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TransformConfig = serde_json::from_str(json)
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check whether the configuration requests no transforms at all.
    pub fn is_empty(&self) -> bool {
        self.handle_missing.is_empty()
            && self.handle_outliers.is_empty()
            && self.scaling.is_none()
            && self.feature_engineering.is_empty()
            && self.encoding.is_empty()
            && self.drop_columns.is_empty()
    }

    /// Validate stage parameters that the type system cannot enforce.
    pub fn validate(&self) -> Result<()> {
        for (column, features) in &self.feature_engineering {
            for feature in features {
                if let DerivedFeature::Binning { n_bins, labels } = feature {
                    if *n_bins == 0 {
                        return Err(PipelineError::InvalidConfig(format!(
                            "binning for '{}' requires at least 1 bin",
                            column
                        )));
                    }
                    if let Some(labels) = labels
                        && labels.len() != *n_bins
                    {
                        return Err(PipelineError::InvalidConfig(format!(
                            "binning for '{}' has {} labels for {} bins",
                            column,
                            labels.len(),
                            n_bins
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Set the missing-value method for a column.
    pub fn with_missing(mut self, column: impl Into<String>, method: MissingMethod) -> Self {
        self.handle_missing.insert(column.into(), method);
        self
    }

    /// Set the outlier method for a column.
    pub fn with_outliers(mut self, column: impl Into<String>, method: OutlierMethod) -> Self {
        self.handle_outliers.insert(column.into(), method);
        self
    }

    /// Set the scaling method and target columns (empty = all numeric).
    pub fn with_scaling(mut self, method: ScalingMethod, columns: Vec<String>) -> Self {
        self.scaling = Some(ScalingConfig { method, columns });
        self
    }

    /// Add derived-feature requests for a column.
    pub fn with_features(
        mut self,
        column: impl Into<String>,
        features: Vec<DerivedFeature>,
    ) -> Self {
        self.feature_engineering.insert(column.into(), features);
        self
    }

    /// Set the encoding method for a column.
    pub fn with_encoding(mut self, column: impl Into<String>, method: EncodingMethod) -> Self {
        self.encoding.insert(column.into(), method);
        self
    }

    /// Add columns to drop after all other stages.
    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }
}
