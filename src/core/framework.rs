use crate::core::processor::SimulatedProcessor;
use crate::core::{
    ConfigProvider, FrameworkMetrics, InitializationReport, PerformanceReport, TaskContext,
    TaskOutcome, TaskProcessor, TaskRequest, TaskResult,
};
use crate::domain::model::{
    Capability, EfficiencyRating, FrameworkStatus, PerformanceSummary, TaskPerformance,
};
use crate::utils::error::{FrameworkError, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;

const MEMORY_EFFICIENCY: &str = "optimal";
const ACCURACY: f64 = 0.99;

/// Executes research tasks and keeps the metrics for every task it ran.
///
/// Clones share configuration, processor and metrics, so a clone can be
/// moved into a spawned worker while the original keeps reporting.
pub struct ResearchFramework<C: ConfigProvider> {
    config: Arc<C>,
    processor: Arc<dyn TaskProcessor>,
    metrics: Arc<Mutex<FrameworkMetrics>>,
    initialized: Arc<AtomicBool>,
    active_batches: Arc<AtomicUsize>,
    sequence: Arc<AtomicU64>,
}

impl<C: ConfigProvider> Clone for ResearchFramework<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            processor: self.processor.clone(),
            metrics: self.metrics.clone(),
            initialized: self.initialized.clone(),
            active_batches: self.active_batches.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

/// 批次結束時（包含 panic）遞減計數
struct BatchGuard(Arc<AtomicUsize>);

impl BatchGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<C: ConfigProvider + 'static> ResearchFramework<C> {
    /// Builds a framework whose tasks run through a [`SimulatedProcessor`].
    pub fn new(config: C) -> Self {
        let processor = SimulatedProcessor::from_millis(config.simulated_latency_ms());
        Self::with_processor(config, Arc::new(processor))
    }

    pub fn with_processor(config: C, processor: Arc<dyn TaskProcessor>) -> Self {
        Self {
            config: Arc::new(config),
            processor,
            metrics: Arc::new(Mutex::new(FrameworkMetrics::default())),
            initialized: Arc::new(AtomicBool::new(false)),
            active_batches: Arc::new(AtomicUsize::new(0)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn initialize(&self) -> InitializationReport {
        tracing::info!(
            "Initializing {} research framework {}",
            self.config.category(),
            self.config.framework_id()
        );

        self.initialized.store(true, Ordering::SeqCst);

        InitializationReport {
            framework: self.config.category().to_string(),
            version: self.config.version().to_string(),
            research_id: self.config.framework_id(),
            status: FrameworkStatus::Initialized,
            capabilities: Capability::ALL.to_vec(),
        }
    }

    /// Runs one task under the configured timeout and records the outcome
    /// in the shared metrics.
    pub async fn execute_task(&self, task: TaskRequest) -> Result<TaskResult> {
        let task_id = self.resolve_task_id(&task);
        let started_at = Utc::now();
        let start = Instant::now();

        tracing::info!(
            "Executing {} research task {}",
            self.config.category(),
            task_id
        );

        let ctx = TaskContext {
            task_id: task_id.clone(),
            framework_id: self.config.framework_id(),
            category: self.config.category().to_string(),
            max_workers: self.config.max_workers(),
        };

        let processed =
            tokio::time::timeout(self.config.timeout(), self.processor.process(&task, &ctx)).await;

        let computation_result = match processed {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                self.lock_metrics().record_failure();
                tracing::warn!("Task {} failed: {}", task_id, e);
                return Err(match e {
                    e @ FrameworkError::TaskFailed { .. } => e,
                    other => FrameworkError::TaskFailed {
                        task_id,
                        message: other.to_string(),
                    },
                });
            }
            Err(_) => {
                self.lock_metrics().record_failure();
                tracing::warn!(
                    "Task {} exceeded timeout of {}s",
                    task_id,
                    self.config.timeout_secs()
                );
                return Err(FrameworkError::TaskTimeout {
                    task_id,
                    timeout_secs: self.config.timeout_secs(),
                });
            }
        };

        let execution_time = start.elapsed().as_secs_f64();
        let framework_metrics = {
            let mut metrics = self.lock_metrics();
            metrics.record_success(execution_time);
            metrics.clone()
        };

        let throughput = if execution_time > 0.0 {
            1.0 / execution_time
        } else {
            0.0
        };

        tracing::debug!("Task {} completed in {:.3}s", task_id, execution_time);

        Ok(TaskResult {
            task_id,
            computation_result,
            execution_time,
            started_at,
            completed_at: Utc::now(),
            performance_metrics: TaskPerformance {
                throughput,
                memory_efficiency: MEMORY_EFFICIENCY.to_string(),
                accuracy: ACCURACY,
                scalability_factor: self.config.max_workers(),
            },
            framework_metrics,
        })
    }

    /// Executes all tasks concurrently, never more than `max_workers` at a
    /// time. Outcomes come back in input order; a failed or panicked task
    /// does not stop the rest.
    pub async fn run_batch(&self, tasks: Vec<TaskRequest>) -> Vec<TaskOutcome> {
        tracing::info!("Starting batch processing of {} tasks", tasks.len());
        let _guard = BatchGuard::enter(&self.active_batches);

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers().max(1)));
        let mut handles = Vec::with_capacity(tasks.len());

        for mut task in tasks {
            // 先決定 ID，worker 失敗時才能回報是哪一筆
            let task_id = self.resolve_task_id(&task);
            task.task_id = Some(task_id.clone());

            let framework = self.clone();
            let semaphore = semaphore.clone();
            let handle = tokio::spawn(async move {
                match semaphore.acquire_owned().await {
                    Ok(_permit) => framework.execute_task(task).await,
                    Err(e) => Err(FrameworkError::WorkerAborted {
                        task_id: task.task_id.unwrap_or_default(),
                        message: e.to_string(),
                    }),
                }
            });
            handles.push((task_id, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (task_id, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(result)) => TaskOutcome::Completed(result),
                Ok(Err(e)) => TaskOutcome::Failed {
                    task_id,
                    error: e.to_string(),
                },
                Err(join_error) => {
                    // panic 時 execute_task 沒機會記錄失敗
                    self.lock_metrics().record_failure();
                    tracing::error!("Worker for task {} aborted: {}", task_id, join_error);
                    let error = FrameworkError::WorkerAborted {
                        task_id: task_id.clone(),
                        message: join_error.to_string(),
                    };
                    TaskOutcome::Failed {
                        task_id,
                        error: error.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        tracing::info!("Batch processing completed: {} results", outcomes.len());
        outcomes
    }

    pub fn performance_report(&self) -> PerformanceReport {
        let metrics = self.metrics();

        let average_task_time = if metrics.tasks_completed > 0 {
            metrics.total_runtime / metrics.tasks_completed as f64
        } else {
            0.0
        };
        let tasks_per_second = if average_task_time > 0.0 {
            1.0 / average_task_time
        } else {
            0.0
        };

        PerformanceReport {
            framework_id: self.config.framework_id(),
            category: self.config.category().to_string(),
            generated_at: Utc::now(),
            performance: PerformanceSummary {
                average_task_time,
                tasks_per_second,
                efficiency_rating: EfficiencyRating::from_metrics(&metrics),
            },
            metrics,
        }
    }

    pub fn metrics(&self) -> FrameworkMetrics {
        self.lock_metrics().clone()
    }

    pub fn status(&self) -> FrameworkStatus {
        if self.active_batches.load(Ordering::SeqCst) > 0 {
            FrameworkStatus::Processing
        } else if self.initialized.load(Ordering::SeqCst) {
            FrameworkStatus::Initialized
        } else {
            FrameworkStatus::Created
        }
    }

    pub fn is_running(&self) -> bool {
        self.status() == FrameworkStatus::Processing
    }

    fn resolve_task_id(&self, task: &TaskRequest) -> String {
        match &task.task_id {
            Some(id) => id.clone(),
            None => {
                let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
                format!(
                    "task_{}_{}_{}",
                    self.config.framework_id(),
                    Utc::now().timestamp(),
                    seq
                )
            }
        }
    }

    fn lock_metrics(&self) -> MutexGuard<'_, FrameworkMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;

    fn fast_config() -> ResearchConfig {
        ResearchConfig {
            simulated_latency_ms: 5,
            ..Default::default()
        }
    }

    /// 記錄同時執行的任務數量
    struct ConcurrencyTracker {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl TaskProcessor for ConcurrencyTracker {
        async fn process(&self, _task: &TaskRequest, ctx: &TaskContext) -> Result<String> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("tracked {}", ctx.task_id))
        }
    }

    /// Fails tasks whose id starts with "bad", panics on "panic".
    struct SelectiveProcessor;

    #[async_trait]
    impl TaskProcessor for SelectiveProcessor {
        async fn process(&self, _task: &TaskRequest, ctx: &TaskContext) -> Result<String> {
            if ctx.task_id.starts_with("panic") {
                panic!("processor crashed");
            }
            if ctx.task_id.starts_with("bad") {
                return Err(FrameworkError::ProcessingError {
                    message: "bad input".to_string(),
                });
            }
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_initialize_reports_capabilities() {
        let framework = ResearchFramework::new(fast_config());
        assert_eq!(framework.status(), FrameworkStatus::Created);

        let report = framework.initialize().await;

        assert_eq!(report.framework, "distributed-computing");
        assert_eq!(report.version, "1.0.0");
        assert_eq!(report.research_id, 1);
        assert_eq!(report.status, FrameworkStatus::Initialized);
        assert_eq!(report.capabilities.len(), 4);
        assert_eq!(report.capabilities[0], Capability::DistributedProcessing);
        assert_eq!(framework.status(), FrameworkStatus::Initialized);
        assert!(!framework.is_running());
    }

    #[tokio::test]
    async fn test_execute_task_updates_metrics() {
        let framework = ResearchFramework::new(fast_config());

        let result = framework
            .execute_task(TaskRequest::with_id("research_1_0"))
            .await
            .unwrap();

        assert_eq!(result.task_id, "research_1_0");
        assert_eq!(
            result.computation_result,
            "Advanced distributed-computing computation completed"
        );
        assert!(result.execution_time >= 0.005);
        assert!(result.performance_metrics.throughput > 0.0);
        assert_eq!(result.performance_metrics.memory_efficiency, "optimal");
        assert_eq!(result.performance_metrics.scalability_factor, 4);
        assert_eq!(result.framework_metrics.tasks_completed, 1);
        assert_eq!(result.framework_metrics.success_rate, 1.0);
        assert!(result.completed_at >= result.started_at);

        let metrics = framework.metrics();
        assert_eq!(metrics.tasks_completed, 1);
        assert!((metrics.total_runtime - result.execution_time).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_generated_task_ids_are_unique() {
        let framework = ResearchFramework::new(ResearchConfig {
            framework_id: 9,
            simulated_latency_ms: 0,
            ..Default::default()
        });

        let outcomes = framework
            .run_batch(vec![TaskRequest::default(); 10])
            .await;

        let ids: HashSet<&str> = outcomes.iter().map(|o| o.task_id()).collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.iter().all(|id| id.starts_with("task_9_")));
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let framework = ResearchFramework::new(fast_config());
        let tasks: Vec<TaskRequest> = (0..6)
            .map(|i| TaskRequest::with_id(format!("research_1_{}", i)))
            .collect();

        let outcomes = framework.run_batch(tasks).await;

        let ids: Vec<&str> = outcomes.iter().map(|o| o.task_id()).collect();
        assert_eq!(
            ids,
            vec![
                "research_1_0",
                "research_1_1",
                "research_1_2",
                "research_1_3",
                "research_1_4",
                "research_1_5"
            ]
        );
        assert!(outcomes.iter().all(TaskOutcome::is_completed));
        assert_eq!(framework.metrics().tasks_completed, 6);
    }

    #[tokio::test]
    async fn test_batch_respects_worker_limit() {
        let tracker = Arc::new(ConcurrencyTracker {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let config = ResearchConfig {
            max_workers: 2,
            ..Default::default()
        };
        let framework = ResearchFramework::with_processor(config, tracker.clone());

        let outcomes = framework
            .run_batch(vec![TaskRequest::default(); 8])
            .await;

        assert_eq!(outcomes.len(), 8);
        assert!(tracker.peak.load(Ordering::SeqCst) <= 2);
        assert!(tracker.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_timeout_marks_task_failed() {
        let config = ResearchConfig {
            timeout: 0.01,
            simulated_latency_ms: 200,
            ..Default::default()
        };
        let framework = ResearchFramework::new(config);

        let err = framework
            .execute_task(TaskRequest::with_id("slow"))
            .await
            .unwrap_err();

        assert!(matches!(err, FrameworkError::TaskTimeout { ref task_id, .. } if task_id == "slow"));
        let metrics = framework.metrics();
        assert_eq!(metrics.tasks_completed, 0);
        assert_eq!(metrics.tasks_failed, 1);
        assert_eq!(metrics.success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let framework =
            ResearchFramework::with_processor(ResearchConfig::default(), Arc::new(SelectiveProcessor));

        let outcomes = framework
            .run_batch(vec![
                TaskRequest::with_id("good_1"),
                TaskRequest::with_id("bad_1"),
                TaskRequest::with_id("panic_1"),
                TaskRequest::with_id("good_2"),
            ])
            .await;

        assert!(outcomes[0].is_completed());
        assert!(matches!(
            &outcomes[1],
            TaskOutcome::Failed { task_id, error } if task_id == "bad_1" && error.contains("bad input")
        ));
        assert!(matches!(
            &outcomes[2],
            TaskOutcome::Failed { task_id, .. } if task_id == "panic_1"
        ));
        assert!(outcomes[3].is_completed());

        let metrics = framework.metrics();
        assert_eq!(metrics.tasks_completed, 2);
        assert_eq!(metrics.tasks_failed, 2);
        assert_eq!(metrics.success_rate, 0.5);
        assert!(!framework.is_running());
    }

    #[tokio::test]
    async fn test_performance_report() {
        let framework = ResearchFramework::new(fast_config());

        let empty = framework.performance_report();
        assert_eq!(empty.performance.average_task_time, 0.0);
        assert_eq!(empty.performance.tasks_per_second, 0.0);
        assert_eq!(empty.performance.efficiency_rating, EfficiencyRating::High);

        framework
            .run_batch(vec![TaskRequest::default(); 3])
            .await;

        let report = framework.performance_report();
        assert_eq!(report.framework_id, 1);
        assert_eq!(report.category, "distributed-computing");
        assert_eq!(report.metrics.tasks_completed, 3);
        let expected_average = report.metrics.total_runtime / 3.0;
        assert!((report.performance.average_task_time - expected_average).abs() < 1e-9);
        assert!((report.performance.tasks_per_second - 1.0 / expected_average).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_status_is_processing_during_batch() {
        let config = ResearchConfig {
            simulated_latency_ms: 100,
            ..Default::default()
        };
        let framework = ResearchFramework::new(config);
        framework.initialize().await;

        let worker = framework.clone();
        let batch = tokio::spawn(async move {
            worker
                .run_batch(vec![TaskRequest::default(); 2])
                .await
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(framework.status(), FrameworkStatus::Processing);
        assert!(framework.is_running());

        let outcomes = batch.await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(framework.status(), FrameworkStatus::Initialized);
        assert!(!framework.is_running());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let framework = ResearchFramework::new(fast_config());
        let outcomes = framework.run_batch(Vec::new()).await;
        assert!(outcomes.is_empty());
        assert_eq!(framework.metrics(), FrameworkMetrics::default());
    }
}
