//! The preprocessing pipeline: configuration in, transformed frame out.
//!
//! Stages always execute in a fixed order, mirroring how an analyst
//! prepares data: missing values first (so later statistics see complete
//! columns), then outliers, scaling, feature engineering, encoding, and
//! finally column dropping. Each stage works best-effort per column,
//! skipping combinations it cannot handle and recording the skip in the
//! returned diagnostics.
//!
//! The input frame is never modified; the caller receives a transformed
//! copy and decides whether to adopt it.

mod encoding;
mod features;
mod missing;
mod outliers;
mod scaling;

use polars::prelude::DataFrame;
use static_assertions::assert_impl_all;
use tracing::{debug, info};

use crate::config::TransformConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::types::{ApplyOutcome, SkipReason, Stage, StageRecorder};

/// Tag a stage-internal failure with the stage name.
///
/// Stages reduce expected per-column problems to skips; anything that
/// still errors out of a stage is unexpected and reported as
/// [`PipelineError::StageFailed`].
fn guard_stage(stage: Stage, result: Result<()>) -> Result<()> {
    result.map_err(|e| PipelineError::StageFailed {
        stage: stage.as_str().to_string(),
        reason: e.to_string(),
    })
}

/// A validated, reusable preprocessing pipeline.
///
/// Construction validates the configuration; [`Pipeline::apply`] may then
/// be called any number of times, against different frames, and is
/// deterministic: the same configuration on the same data yields the same
/// result.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: TransformConfig,
}

assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Build a pipeline from a configuration, rejecting invalid parameters.
    pub fn new(config: TransformConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Parse the configuration from JSON and build a pipeline.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(TransformConfig::from_json(json).context("parsing transform configuration")?)
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Run every configured stage against a copy of `data`.
    pub fn apply(&self, data: &DataFrame) -> Result<ApplyOutcome> {
        let mut df = data.clone();
        let rows_before = df.height();
        let columns_before = df.width();
        let mut applied = Vec::new();
        let mut outcomes = Vec::new();

        debug!(rows = rows_before, columns = columns_before, "pipeline run started");

        if !self.config.handle_missing.is_empty() {
            let mut rec = StageRecorder::new(Stage::HandleMissing);
            guard_stage(
                Stage::HandleMissing,
                missing::apply(&mut df, &self.config.handle_missing, &mut rec),
            )?;
            rec.finish(
                serde_json::to_value(&self.config.handle_missing)?,
                &mut applied,
                &mut outcomes,
            );
        }

        if !self.config.handle_outliers.is_empty() {
            let mut rec = StageRecorder::new(Stage::HandleOutliers);
            guard_stage(
                Stage::HandleOutliers,
                outliers::apply(&mut df, &self.config.handle_outliers, &mut rec),
            )?;
            rec.finish(
                serde_json::to_value(&self.config.handle_outliers)?,
                &mut applied,
                &mut outcomes,
            );
        }

        if let Some(scaling) = &self.config.scaling {
            let mut rec = StageRecorder::new(Stage::Scaling);
            guard_stage(Stage::Scaling, scaling::apply(&mut df, scaling, &mut rec))?;
            rec.finish(serde_json::to_value(scaling)?, &mut applied, &mut outcomes);
        }

        if !self.config.feature_engineering.is_empty() {
            let mut rec = StageRecorder::new(Stage::FeatureEngineering);
            guard_stage(
                Stage::FeatureEngineering,
                features::apply(&mut df, &self.config.feature_engineering, &mut rec),
            )?;
            rec.finish(
                serde_json::to_value(&self.config.feature_engineering)?,
                &mut applied,
                &mut outcomes,
            );
        }

        if !self.config.encoding.is_empty() {
            let mut rec = StageRecorder::new(Stage::Encoding);
            guard_stage(
                Stage::Encoding,
                encoding::apply(&mut df, &self.config.encoding, &mut rec),
            )?;
            rec.finish(
                serde_json::to_value(&self.config.encoding)?,
                &mut applied,
                &mut outcomes,
            );
        }

        if !self.config.drop_columns.is_empty() {
            let mut rec = StageRecorder::new(Stage::DropColumns);
            for column in &self.config.drop_columns {
                if df.drop_in_place(column).is_ok() {
                    rec.applied(column, format!("Dropped column '{}'", column));
                } else {
                    rec.skipped(column, SkipReason::ColumnMissing);
                }
            }
            rec.finish(
                serde_json::to_value(&self.config.drop_columns)?,
                &mut applied,
                &mut outcomes,
            );
        }

        info!(
            rows_before,
            rows_after = df.height(),
            columns_before,
            columns_after = df.width(),
            stages_applied = applied.len(),
            "pipeline run complete"
        );

        Ok(ApplyOutcome {
            data: df,
            applied,
            outcomes,
            rows_before,
            columns_before,
        })
    }
}
