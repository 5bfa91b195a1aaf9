use crate::config::{
    validate_provider, DEFAULT_LATENCY_MS, DEFAULT_MAX_WORKERS, DEFAULT_SAMPLE_TASKS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_VERSION,
};
use crate::core::ConfigProvider;
use crate::domain::model::OutputFormat;
use crate::utils::error::{FrameworkError, Result};
use crate::utils::validation::{validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_FORMATS: &[OutputFormat] = &[OutputFormat::Json];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub framework: FrameworkSection,
    #[serde(default)]
    pub execution: ExecutionSection,
    pub tasks: Option<TasksSection>,
    pub output: Option<OutputSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkSection {
    pub id: u32,
    pub category: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionSection {
    pub max_workers: Option<usize>,
    pub timeout_seconds: Option<f64>,
    pub simulated_latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksSection {
    pub file: Option<String>,
    pub sample_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
    pub formats: Option<Vec<OutputFormat>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub system_stats: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FrameworkError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WORKERS})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FrameworkError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn task_file(&self) -> Option<&str> {
        self.tasks.as_ref().and_then(|t| t.file.as_deref())
    }

    pub fn sample_count(&self) -> usize {
        self.tasks
            .as_ref()
            .and_then(|t| t.sample_count)
            .unwrap_or(DEFAULT_SAMPLE_TASKS)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .map(|m| m.enabled && m.system_stats.unwrap_or(true))
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn framework_id(&self) -> u32 {
        self.framework.id
    }

    fn category(&self) -> &str {
        &self.framework.category
    }

    fn version(&self) -> &str {
        self.framework.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    fn max_workers(&self) -> usize {
        self.execution.max_workers.unwrap_or(DEFAULT_MAX_WORKERS)
    }

    fn timeout_secs(&self) -> f64 {
        self.execution.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    fn simulated_latency_ms(&self) -> u64 {
        self.execution
            .simulated_latency_ms
            .unwrap_or(DEFAULT_LATENCY_MS)
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.path.as_str())
    }

    fn output_formats(&self) -> &[OutputFormat] {
        match &self.output {
            Some(OutputSection {
                formats: Some(formats),
                ..
            }) => formats,
            Some(_) => DEFAULT_FORMATS,
            None => &[],
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        if let Some(file) = self.task_file() {
            validate_path("tasks.file", file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[framework]
id = 7
category = "distributed-computing"
version = "2.1.0"

[execution]
max_workers = 2
timeout_seconds = 5
simulated_latency_ms = 10

[tasks]
sample_count = 3

[output]
path = "./reports"
formats = ["json", "csv"]

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.framework_id(), 7);
        assert_eq!(config.version(), "2.1.0");
        assert_eq!(config.max_workers(), 2);
        assert_eq!(config.timeout_secs(), 5.0);
        assert_eq!(config.simulated_latency_ms(), 10);
        assert_eq!(config.sample_count(), 3);
        assert_eq!(config.output_path(), Some("./reports"));
        assert_eq!(
            config.output_formats(),
            &[OutputFormat::Json, OutputFormat::Csv]
        );
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_content = r#"
[framework]
id = 1
category = "distributed-computing"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.version(), DEFAULT_VERSION);
        assert_eq!(config.max_workers(), DEFAULT_MAX_WORKERS);
        assert_eq!(config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.sample_count(), DEFAULT_SAMPLE_TASKS);
        assert!(config.output_path().is_none());
        assert!(config.output_formats().is_empty());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RESEARCH_TEST_CATEGORY", "graph-analytics");

        let toml_content = r#"
[framework]
id = 1
category = "${RESEARCH_TEST_CATEGORY}"

[tasks]
file = "${RESEARCH_TEST_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.category(), "graph-analytics");
        assert_eq!(config.task_file(), Some("${RESEARCH_TEST_UNSET_VARIABLE}"));

        std::env::remove_var("RESEARCH_TEST_CATEGORY");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[framework]
id = 1
category = "distributed-computing"

[execution]
max_workers = 0
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(FrameworkError::InvalidConfigValueError { ref field, .. }) if field == "max_workers"
        ));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = TomlConfig::from_toml_str("[framework\nid = ");
        assert!(matches!(
            result,
            Err(FrameworkError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_missing_config_file_exits_as_storage_error() {
        let err = TomlConfig::from_file("/nonexistent/research.toml").unwrap_err();
        assert!(matches!(err, FrameworkError::IoError(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[framework]
id = 3
category = "file-test"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.framework.category, "file-test");
        assert_eq!(config.framework_id(), 3);
    }
}
