//! Result and diagnostics types returned by the pipeline.
//!
//! A pipeline run returns an [`ApplyOutcome`]: the transformed frame, the
//! applied-configuration record (what the caller appends to its session log
//! and feeds to the report generator), and a per-column diagnostics list
//! that makes the stages' best-effort skipping observable instead of silent.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// The six pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    HandleMissing,
    HandleOutliers,
    Scaling,
    FeatureEngineering,
    Encoding,
    DropColumns,
}

impl Stage {
    /// Stage name as it appears in configuration and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandleMissing => "handle_missing",
            Self::HandleOutliers => "handle_outliers",
            Self::Scaling => "scaling",
            Self::FeatureEngineering => "feature_engineering",
            Self::Encoding => "encoding",
            Self::DropColumns => "drop_columns",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a configured transform was skipped for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The configured column does not exist in the dataset
    ColumnMissing,
    /// The transform requires a numeric column
    NotNumeric,
    /// The transform requires a string column
    NotText,
    /// The transform requires a date or datetime column
    NotDatetime,
    /// The transform requires a categorical (string) column
    NotCategorical,
    /// Missing-value handling was requested for a column with no nulls
    NoMissingValues,
    /// The column has no non-null values to compute a statistic from
    EmptyColumn,
}

impl SkipReason {
    /// Human-readable description for diagnostics display.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ColumnMissing => "column not present in dataset",
            Self::NotNumeric => "column is not numeric",
            Self::NotText => "column is not text",
            Self::NotDatetime => "column is not a date/datetime",
            Self::NotCategorical => "column is not categorical",
            Self::NoMissingValues => "column has no missing values",
            Self::EmptyColumn => "column has no non-null values",
        }
    }
}

/// Outcome of one configured transform on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum OutcomeStatus {
    /// The transform was applied; `detail` describes what changed.
    Applied { detail: String },
    /// The transform was skipped; `reason` says why.
    Skipped { reason: SkipReason },
}

/// Per-column record of what a stage did (or declined to do).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutcome {
    pub stage: Stage,
    pub column: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ColumnOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OutcomeStatus::Applied { .. })
    }
}

/// One stage's entry in the applied-configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedStage {
    /// Stage name (record key)
    pub stage: Stage,
    /// The configuration fragment that was applied, as JSON
    pub params: serde_json::Value,
    /// Human-readable descriptions of the changes made
    pub details: Vec<String>,
}

/// Result of one pipeline run.
///
/// The pipeline is stateless: the caller owns the session log and decides
/// whether to adopt `data` as its new working copy.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The transformed dataset
    pub data: DataFrame,
    /// Stages that actually changed the dataset, in execution order
    pub applied: Vec<AppliedStage>,
    /// Per-column applied/skipped diagnostics across all stages
    pub outcomes: Vec<ColumnOutcome>,
    /// Row count before any transform ran
    pub rows_before: usize,
    /// Column count before any transform ran
    pub columns_before: usize,
}

impl ApplyOutcome {
    /// Whether a given stage applied at least one transform.
    pub fn stage_applied(&self, stage: Stage) -> bool {
        self.applied.iter().any(|a| a.stage == stage)
    }

    /// All skipped-column diagnostics.
    pub fn skips(&self) -> impl Iterator<Item = &ColumnOutcome> {
        self.outcomes.iter().filter(|o| !o.is_applied())
    }

    /// Rows removed by row-dropping transforms.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.data.height())
    }
}

/// Collects one stage's applied details and per-column outcomes.
///
/// Each stage writes into a recorder; the pipeline folds recorders into
/// the final [`ApplyOutcome`].
#[derive(Debug)]
pub(crate) struct StageRecorder {
    stage: Stage,
    details: Vec<String>,
    outcomes: Vec<ColumnOutcome>,
}

impl StageRecorder {
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            stage,
            details: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Record a transform that was applied to a column.
    pub(crate) fn applied(&mut self, column: impl Into<String>, detail: impl Into<String>) {
        let detail = detail.into();
        self.details.push(detail.clone());
        self.outcomes.push(ColumnOutcome {
            stage: self.stage,
            column: column.into(),
            status: OutcomeStatus::Applied { detail },
        });
    }

    /// Record a transform that was skipped for a column.
    pub(crate) fn skipped(&mut self, column: impl Into<String>, reason: SkipReason) {
        self.outcomes.push(ColumnOutcome {
            stage: self.stage,
            column: column.into(),
            status: OutcomeStatus::Skipped { reason },
        });
    }

    pub(crate) fn any_applied(&self) -> bool {
        !self.details.is_empty()
    }

    /// Fold this recorder into the outcome lists, emitting an
    /// [`AppliedStage`] entry when the stage changed the dataset.
    pub(crate) fn finish(
        self,
        params: serde_json::Value,
        applied: &mut Vec<AppliedStage>,
        outcomes: &mut Vec<ColumnOutcome>,
    ) {
        if self.any_applied() {
            applied.push(AppliedStage {
                stage: self.stage,
                params,
                details: self.details,
            });
        }
        outcomes.extend(self.outcomes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::HandleMissing.as_str(), "handle_missing");
        assert_eq!(Stage::DropColumns.as_str(), "drop_columns");
        assert_eq!(format!("{}", Stage::Scaling), "scaling");
    }

    #[test]
    fn test_recorder_collects_applied_and_skipped() {
        let mut rec = StageRecorder::new(Stage::HandleMissing);
        rec.applied("age", "Filled 'age' with median: 30.00");
        rec.skipped("city", SkipReason::NoMissingValues);
        assert!(rec.any_applied());

        let mut applied = Vec::new();
        let mut outcomes = Vec::new();
        rec.finish(serde_json::json!({"age": "median"}), &mut applied, &mut outcomes);

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].stage, Stage::HandleMissing);
        assert_eq!(applied[0].details.len(), 1);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_applied());
        assert!(!outcomes[1].is_applied());
    }

    #[test]
    fn test_recorder_skips_only_emits_no_applied_stage() {
        let mut rec = StageRecorder::new(Stage::Encoding);
        rec.skipped("price", SkipReason::NotCategorical);

        let mut applied = Vec::new();
        let mut outcomes = Vec::new();
        rec.finish(serde_json::Value::Null, &mut applied, &mut outcomes);

        assert!(applied.is_empty());
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn test_column_outcome_serialization() {
        let outcome = ColumnOutcome {
            stage: Stage::Scaling,
            column: "age".to_string(),
            status: OutcomeStatus::Skipped {
                reason: SkipReason::NotNumeric,
            },
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"stage\":\"scaling\""));
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(json.contains("not_numeric"));
    }
}
