use crate::core::{TaskContext, TaskProcessor, TaskRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Stands in for real research computation: waits a fixed latency and
/// reports completion for the framework's category.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    latency: Duration,
}

impl SimulatedProcessor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_millis(latency_ms: u64) -> Self {
        Self::new(Duration::from_millis(latency_ms))
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl TaskProcessor for SimulatedProcessor {
    async fn process(&self, task: &TaskRequest, ctx: &TaskContext) -> Result<String> {
        tracing::trace!(
            "Simulating {:?} work for task {} ({:?})",
            self.latency,
            ctx.task_id,
            task.complexity
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(format!("Advanced {} computation completed", ctx.category))
    }
}
