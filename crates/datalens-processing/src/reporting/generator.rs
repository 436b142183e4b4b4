//! Report file output.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::reporting::ProcessingReport;

/// Writes processing reports to disk as Markdown and JSON.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `<stem>.md` and `<stem>.json` into the output directory,
    /// returning the two paths.
    pub fn write(&self, report: &ProcessingReport, stem: &str) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            PipelineError::ReportGenerationFailed(format!(
                "cannot create '{}': {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let markdown_path = self.output_dir.join(format!("{}.md", stem));
        let json_path = self.output_dir.join(format!("{}.json", stem));

        fs::write(&markdown_path, report.to_markdown())?;
        fs::write(&json_path, report.to_json()?)?;

        info!(
            markdown = %markdown_path.display(),
            json = %json_path.display(),
            "wrote processing report"
        );
        Ok((markdown_path, json_path))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
