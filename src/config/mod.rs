pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::OutputFormat;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAMEWORK_ID: u32 = 1;
pub const DEFAULT_CATEGORY: &str = "distributed-computing";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_LATENCY_MS: u64 = 100;
pub const DEFAULT_SAMPLE_TASKS: usize = 5;

const MIN_TIMEOUT_SECS: f64 = 0.001;
const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// 框架的基本設定，未指定時使用預設值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub framework_id: u32,
    pub category: String,
    pub version: String,
    pub max_workers: usize,
    pub timeout: f64,
    pub simulated_latency_ms: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            framework_id: DEFAULT_FRAMEWORK_ID,
            category: DEFAULT_CATEGORY.to_string(),
            version: DEFAULT_VERSION.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout: DEFAULT_TIMEOUT_SECS,
            simulated_latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

impl ConfigProvider for ResearchConfig {
    fn framework_id(&self) -> u32 {
        self.framework_id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn max_workers(&self) -> usize {
        self.max_workers
    }

    fn timeout_secs(&self) -> f64 {
        self.timeout
    }

    fn simulated_latency_ms(&self) -> u64 {
        self.simulated_latency_ms
    }

    fn output_path(&self) -> Option<&str> {
        None
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &[]
    }
}

impl Validate for ResearchConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// Checks the settings every config source shares.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("category", config.category())?;
    validate_non_empty_string("version", config.version())?;
    validate_positive_number("max_workers", config.max_workers(), 1)?;
    validate_range(
        "timeout",
        config.timeout_secs(),
        MIN_TIMEOUT_SECS,
        MAX_TIMEOUT_SECS,
    )?;

    if let Some(path) = config.output_path() {
        validate_path("output_path", path)?;
    }

    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "research-framework")]
#[command(about = "Run research tasks through a bounded concurrent executor")]
pub struct CliConfig {
    #[arg(long, default_value_t = DEFAULT_FRAMEWORK_ID)]
    pub framework_id: u32,

    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,

    #[arg(long, default_value = DEFAULT_VERSION)]
    pub framework_version: String,

    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Per-task timeout in seconds")]
    pub timeout: f64,

    #[arg(long, default_value_t = DEFAULT_LATENCY_MS, help = "Simulated processing time per task")]
    pub latency_ms: u64,

    #[arg(long, help = "JSON file containing an array of tasks")]
    pub tasks: Option<String>,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_TASKS)]
    pub sample_tasks: usize,

    #[arg(long, help = "Directory for report files")]
    pub output: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn framework_id(&self) -> u32 {
        self.framework_id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn version(&self) -> &str {
        &self.framework_version
    }

    fn max_workers(&self) -> usize {
        self.max_workers
    }

    fn timeout_secs(&self) -> f64 {
        self.timeout
    }

    fn simulated_latency_ms(&self) -> u64 {
        self.latency_ms
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        if let Some(tasks) = &self.tasks {
            validate_path("tasks", tasks)?;
        }
        Ok(())
    }
}
