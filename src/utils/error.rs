use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid task input: {message}")]
    TaskInputError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Task {task_id} timed out after {timeout_secs}s")]
    TaskTimeout { task_id: String, timeout_secs: f64 },

    #[error("Task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("Worker for task {task_id} aborted: {message}")]
    WorkerAborted { task_id: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Execution,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FrameworkError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FrameworkError::ConfigError { .. }
            | FrameworkError::ConfigValidationError { .. }
            | FrameworkError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FrameworkError::SerializationError(_) | FrameworkError::TaskInputError { .. } => {
                ErrorCategory::Input
            }
            FrameworkError::ProcessingError { .. }
            | FrameworkError::TaskTimeout { .. }
            | FrameworkError::TaskFailed { .. }
            | FrameworkError::WorkerAborted { .. } => ErrorCategory::Execution,
            FrameworkError::IoError(_) | FrameworkError::CsvError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一任務逾時可重試
            FrameworkError::TaskTimeout { .. } => ErrorSeverity::Medium,
            FrameworkError::ProcessingError { .. }
            | FrameworkError::TaskFailed { .. }
            | FrameworkError::TaskInputError { .. } => ErrorSeverity::High,
            FrameworkError::SerializationError(_) => ErrorSeverity::High,
            FrameworkError::ConfigError { .. }
            | FrameworkError::ConfigValidationError { .. }
            | FrameworkError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            FrameworkError::WorkerAborted { .. }
            | FrameworkError::IoError(_)
            | FrameworkError::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration values (max_workers >= 1, timeout > 0, non-empty category)"
            }
            ErrorCategory::Input => "Make sure the task file is a JSON array of task objects",
            ErrorCategory::Execution => match self {
                FrameworkError::TaskTimeout { .. } => {
                    "Increase --timeout or reduce the simulated latency"
                }
                _ => "Re-run with --verbose to see the failing task's details",
            },
            ErrorCategory::Storage => "Verify the output directory exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FrameworkError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            FrameworkError::TaskTimeout { task_id, .. } => {
                format!("Task '{}' did not finish in time", task_id)
            }
            FrameworkError::IoError(e) => format!("File operation failed: {}", e),
            other => other.to_string(),
        }
    }

    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = FrameworkError::InvalidConfigValueError {
            field: "max_workers".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("max_workers"));
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = FrameworkError::TaskTimeout {
            task_id: "task_1".to_string(),
            timeout_secs: 0.5,
        };
        assert_eq!(err.category(), ErrorCategory::Execution);
        assert_eq!(err.exit_code(), 2);
        assert!(err.recovery_suggestion().contains("--timeout"));
        assert_eq!(err.to_string(), "Task task_1 timed out after 0.5s");
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: FrameworkError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
