//! Processing report generation.
//!
//! Builds a [`ProcessingReport`] from the before/after dataset profiles and
//! a pipeline outcome, and renders it as Markdown for the dashboard's
//! report panel or as JSON for programmatic consumers.

mod generator;

pub use generator::ReportGenerator;

use chrono::Local;
use serde::Serialize;

use crate::error::Result;
use crate::profiler::DatasetSummary;
use crate::types::{ApplyOutcome, ColumnOutcome};

/// Shape delta of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeChange {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

impl ShapeChange {
    pub fn changed(&self) -> bool {
        self.rows_before != self.rows_after || self.columns_before != self.columns_after
    }
}

/// A complete report over one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingReport {
    pub title: String,
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub shape: ShapeChange,
    /// Profile of the input dataset
    pub before: DatasetSummary,
    /// Profile of the transformed dataset
    pub after: DatasetSummary,
    /// Stages that changed the dataset, with their parameters and details
    pub applied: Vec<AppliedStageReport>,
    /// Transforms that were skipped, with reasons
    pub skipped: Vec<ColumnOutcome>,
}

/// One applied stage as rendered in the report.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedStageReport {
    pub stage: String,
    pub params: serde_json::Value,
    pub details: Vec<String>,
}

impl ProcessingReport {
    /// Assemble a report from a pipeline outcome and the two profiles.
    pub fn build(
        title: impl Into<String>,
        before: DatasetSummary,
        after: DatasetSummary,
        outcome: &ApplyOutcome,
    ) -> Self {
        let applied = outcome
            .applied
            .iter()
            .map(|stage| AppliedStageReport {
                stage: stage.stage.as_str().to_string(),
                params: stage.params.clone(),
                details: stage.details.clone(),
            })
            .collect();
        let skipped = outcome.skips().cloned().collect();

        Self {
            title: title.into(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            shape: ShapeChange {
                rows_before: outcome.rows_before,
                rows_after: outcome.data.height(),
                columns_before: outcome.columns_before,
                columns_after: outcome.data.width(),
            },
            before,
            after,
            applied,
            skipped,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the report as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("**Generated:** {}\n\n", self.generated_at));

        out.push_str("## 1. Data Overview\n\n");
        out.push_str(&format!("* Rows: {}\n", self.after.rows));
        out.push_str(&format!("* Columns: {}\n", self.after.columns));
        out.push_str(&format!("* Missing values: {}\n", self.after.total_missing));
        out.push_str(&format!("* Duplicate rows: {}\n\n", self.after.duplicate_rows));

        out.push_str("### 1.1 Column Types\n\n");
        out.push_str("| Column | Type | Nulls | Null % | Unique |\n");
        out.push_str("|--------|------|-------|--------|--------|\n");
        for col in &self.after.column_summaries {
            out.push_str(&format!(
                "| {} | {} | {} | {:.2} | {} |\n",
                col.name, col.dtype, col.null_count, col.null_percentage, col.unique_count
            ));
        }
        out.push('\n');

        out.push_str("## 2. Summary Statistics\n\n");
        let numeric: Vec<_> = self
            .after
            .column_summaries
            .iter()
            .filter_map(|c| c.numeric.as_ref().map(|n| (c, n)))
            .collect();
        if !numeric.is_empty() {
            out.push_str("### 2.1 Numeric Columns\n\n");
            out.push_str("| Column | Mean | Std | Min | Median | Max |\n");
            out.push_str("|--------|------|-----|-----|--------|-----|\n");
            for (col, stats) in numeric {
                out.push_str(&format!(
                    "| {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
                    col.name, stats.mean, stats.std, stats.min, stats.median, stats.max
                ));
            }
            out.push('\n');
        }
        let categorical: Vec<_> = self
            .after
            .column_summaries
            .iter()
            .filter_map(|c| c.categorical.as_ref().map(|s| (c, s)))
            .collect();
        if !categorical.is_empty() {
            out.push_str("### 2.2 Categorical Columns\n\n");
            for (col, stats) in categorical {
                out.push_str(&format!(
                    "* **{}**: {} distinct values, most frequent '{}'\n",
                    col.name, stats.distinct_count, stats.most_frequent
                ));
            }
            out.push('\n');
        }

        if !self.applied.is_empty() {
            out.push_str("## 3. Applied Preprocessing\n\n");
            for (i, stage) in self.applied.iter().enumerate() {
                out.push_str(&format!("### 3.{} {}\n\n", i + 1, stage.stage));
                for detail in &stage.details {
                    out.push_str(&format!("* {}\n", detail));
                }
                out.push_str(&format!(
                    "\n```json\n{}\n```\n\n",
                    serde_json::to_string_pretty(&stage.params).unwrap_or_default()
                ));
            }

            if self.shape.changed() {
                out.push_str("### 3.99 Impact\n\n");
                out.push_str(&format!(
                    "* Original data: {} rows x {} columns\n",
                    self.shape.rows_before, self.shape.columns_before
                ));
                out.push_str(&format!(
                    "* Processed data: {} rows x {} columns\n\n",
                    self.shape.rows_after, self.shape.columns_after
                ));
            }
        }

        if !self.skipped.is_empty() {
            out.push_str("## 4. Skipped Transforms\n\n");
            for skip in &self.skipped {
                if let crate::types::OutcomeStatus::Skipped { reason } = &skip.status {
                    out.push_str(&format!(
                        "* `{}` on '{}': {}\n",
                        skip.stage,
                        skip.column,
                        reason.describe()
                    ));
                }
            }
            out.push('\n');
        }

        out
    }
}
