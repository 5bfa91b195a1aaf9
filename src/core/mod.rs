pub mod engine;
pub mod export;
pub mod framework;
pub mod processor;
pub mod tasks;

pub use crate::domain::model::{
    FrameworkMetrics, InitializationReport, PerformanceReport, RunSummary, TaskOutcome,
    TaskRequest, TaskResult,
};
pub use crate::domain::ports::{ConfigProvider, Storage, TaskContext, TaskProcessor};
pub use crate::utils::error::Result;
