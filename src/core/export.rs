use crate::core::{RunSummary, Storage, TaskOutcome};
use crate::domain::model::OutputFormat;
use crate::utils::error::{FrameworkError, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TaskRow<'a> {
    task_id: &'a str,
    status: &'static str,
    execution_time: Option<f64>,
    throughput: Option<f64>,
    error: Option<&'a str>,
}

impl<'a> From<&'a TaskOutcome> for TaskRow<'a> {
    fn from(outcome: &'a TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Completed(result) => TaskRow {
                task_id: &result.task_id,
                status: "completed",
                execution_time: Some(result.execution_time),
                throughput: Some(result.performance_metrics.throughput),
                error: None,
            },
            TaskOutcome::Failed { task_id, error } => TaskRow {
                task_id,
                status: "failed",
                execution_time: None,
                throughput: None,
                error: Some(error.as_str()),
            },
        }
    }
}

/// Writes a run summary through a [`Storage`] in the requested formats.
pub struct ReportExporter<S: Storage> {
    storage: S,
    formats: Vec<OutputFormat>,
}

impl<S: Storage> ReportExporter<S> {
    pub fn new(storage: S, formats: &[OutputFormat]) -> Self {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(format) {
                unique.push(*format);
            }
        }

        Self {
            storage,
            formats: unique,
        }
    }

    /// Returns the file names that were written.
    pub async fn export(&self, summary: &RunSummary) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(self.formats.len());

        for format in &self.formats {
            let data = match format {
                OutputFormat::Json => serde_json::to_vec_pretty(summary)?,
                OutputFormat::Csv => render_csv(&summary.outcomes)?,
            };

            let file_name = format.file_name();
            self.storage.write_file(file_name, &data).await?;
            tracing::info!("📁 Wrote {}", file_name);
            written.push(file_name.to_string());
        }

        Ok(written)
    }
}

/// 終端機輸出：初始化報告、每筆任務結果、效能報告
pub fn render_console_summary(summary: &RunSummary) -> Result<String> {
    let mut lines = vec![format!(
        "Framework initialized: {}",
        serde_json::to_string(&summary.initialization)?
    )];

    for outcome in &summary.outcomes {
        lines.push(match outcome {
            TaskOutcome::Completed(result) => {
                format!("  ✅ {} ({:.3}s)", result.task_id, result.execution_time)
            }
            TaskOutcome::Failed { task_id, error } => format!("  ❌ {}: {}", task_id, error),
        });
    }

    lines.push(format!(
        "Performance Report: {}",
        serde_json::to_string_pretty(&summary.report)?
    ));
    Ok(lines.join("\n"))
}

const CSV_HEADER: [&str; 5] = ["task_id", "status", "execution_time", "throughput", "error"];

fn render_csv(outcomes: &[TaskOutcome]) -> Result<Vec<u8>> {
    // 空批次也要有表頭
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for outcome in outcomes {
        writer.serialize(TaskRow::from(outcome))?;
    }

    writer
        .into_inner()
        .map_err(|e| FrameworkError::IoError(e.into_error()))
}
