use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// 一筆研究任務。未知欄位會原封不動保留在 `extra`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TaskRequest {
    pub fn with_id(task_id: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    DistributedProcessing,
    RealTimeAnalysis,
    PerformanceOptimization,
    ScalableArchitecture,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::DistributedProcessing,
        Capability::RealTimeAnalysis,
        Capability::PerformanceOptimization,
        Capability::ScalableArchitecture,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkStatus {
    Created,
    Initialized,
    Processing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializationReport {
    pub framework: String,
    pub version: String,
    pub research_id: u32,
    pub status: FrameworkStatus,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworkMetrics {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    /// seconds
    pub total_runtime: f64,
    pub success_rate: f64,
}

impl FrameworkMetrics {
    pub fn record_success(&mut self, execution_time: f64) {
        self.tasks_completed += 1;
        self.total_runtime += execution_time;
        self.refresh_success_rate();
    }

    pub fn record_failure(&mut self) {
        self.tasks_failed += 1;
        self.refresh_success_rate();
    }

    pub fn tasks_attempted(&self) -> u64 {
        self.tasks_completed + self.tasks_failed
    }

    fn refresh_success_rate(&mut self) {
        let attempted = self.tasks_attempted();
        self.success_rate = if attempted > 0 {
            self.tasks_completed as f64 / attempted as f64
        } else {
            0.0
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPerformance {
    pub throughput: f64,
    pub memory_efficiency: String,
    pub accuracy: f64,
    pub scalability_factor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub computation_result: String,
    /// seconds
    pub execution_time: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub performance_metrics: TaskPerformance,
    pub framework_metrics: FrameworkMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskOutcome {
    Completed(TaskResult),
    Failed { task_id: String, error: String },
}

impl TaskOutcome {
    pub fn task_id(&self) -> &str {
        match self {
            TaskOutcome::Completed(result) => &result.task_id,
            TaskOutcome::Failed { task_id, .. } => task_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyRating {
    High,
    Medium,
    Low,
}

impl EfficiencyRating {
    pub fn from_metrics(metrics: &FrameworkMetrics) -> Self {
        if metrics.tasks_attempted() == 0 || metrics.success_rate >= 0.95 {
            EfficiencyRating::High
        } else if metrics.success_rate >= 0.75 {
            EfficiencyRating::Medium
        } else {
            EfficiencyRating::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub average_task_time: f64,
    pub tasks_per_second: f64,
    pub efficiency_rating: EfficiencyRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub framework_id: u32,
    pub category: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: FrameworkMetrics,
    pub performance: PerformanceSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "research_report.json",
            OutputFormat::Csv => "task_results.csv",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unsupported format '{}'. Valid formats: json, csv", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub initialization: InitializationReport,
    pub outcomes: Vec<TaskOutcome>,
    pub report: PerformanceReport,
}
