use crate::domain::model::{OutputFormat, TaskRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn framework_id(&self) -> u32;
    fn category(&self) -> &str;
    fn version(&self) -> &str;
    fn max_workers(&self) -> usize;
    /// Per-task time limit in seconds.
    fn timeout_secs(&self) -> f64;
    fn simulated_latency_ms(&self) -> u64;
    fn output_path(&self) -> Option<&str>;
    fn output_formats(&self) -> &[OutputFormat];

    fn timeout(&self) -> Duration {
        let secs = self.timeout_secs();
        if secs.is_nan() || secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        }
    }
}

/// 任務執行時可見的框架資訊
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task_id: String,
    pub framework_id: u32,
    pub category: String,
    pub max_workers: usize,
}

#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Runs one task and returns its computation result text.
    async fn process(&self, task: &TaskRequest, ctx: &TaskContext) -> Result<String>;
}
