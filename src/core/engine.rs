use crate::core::framework::ResearchFramework;
use crate::core::{ConfigProvider, RunSummary, TaskRequest};
use crate::utils::monitor::{RunPhase, SystemMonitor};

pub struct ResearchEngine<C: ConfigProvider + 'static> {
    framework: ResearchFramework<C>,
    monitor: SystemMonitor,
}

impl<C: ConfigProvider + 'static> ResearchEngine<C> {
    pub fn new(framework: ResearchFramework<C>) -> Self {
        Self::new_with_monitoring(framework, false)
    }

    pub fn new_with_monitoring(framework: ResearchFramework<C>, monitor_enabled: bool) -> Self {
        Self {
            framework,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn framework(&self) -> &ResearchFramework<C> {
        &self.framework
    }

    /// 初始化 → 批次執行 → 產生報告
    pub async fn run(&self, tasks: Vec<TaskRequest>) -> RunSummary {
        let task_count = tasks.len();

        let initialization = self.framework.initialize().await;
        tracing::debug!("Framework initialized: {:?}", initialization);
        self.monitor.log_phase(RunPhase::Initialize, 0, task_count);

        let outcomes = self.framework.run_batch(tasks).await;
        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        self.monitor.log_phase(RunPhase::Batch, completed, task_count);

        let failed = task_count.saturating_sub(completed);
        if failed > 0 {
            tracing::warn!("{} of {} tasks failed", failed, task_count);
        }

        let report = self.framework.performance_report();
        tracing::info!(
            "Performance: {} completed, avg {:.3}s/task, {:.2} tasks/s, rating {:?}",
            report.metrics.tasks_completed,
            report.performance.average_task_time,
            report.performance.tasks_per_second,
            report.performance.efficiency_rating
        );
        self.monitor.log_phase(RunPhase::Report, completed, task_count);
        self.monitor.log_final_stats(
            report.metrics.tasks_completed,
            report.performance.tasks_per_second,
        );

        RunSummary {
            initialization,
            outcomes,
            report,
        }
    }
}
