#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// 研究執行流程中的監控時間點
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Initialize,
    Batch,
    Report,
}

impl RunPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RunPhase::Initialize => "Initialize",
            RunPhase::Batch => "Task batch",
            RunPhase::Report => "Performance report",
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ResourceSample {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub memory_percent: f32,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
impl ResourceSample {
    fn phase_line(&self, phase: RunPhase, completed: usize, total: usize) -> String {
        format!(
            "📊 {} [{}/{} tasks] - CPU: {:.1}%, Memory: {}MB ({:.1}%), Peak: {}MB, Elapsed: {:.2}s",
            phase.label(),
            completed,
            total,
            self.cpu_usage,
            self.memory_mb,
            self.memory_percent,
            self.peak_memory_mb,
            self.elapsed.as_secs_f64()
        )
    }
}

/// 追蹤研究程序的 CPU 與記憶體使用量，停用時所有紀錄皆為 no-op。
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    started: Instant,
    peak_memory_mb: Arc<Mutex<u64>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("Resource monitoring unavailable: {}", e);
                None
            }
        };

        if enabled {
            system.refresh_all();
        }

        Self {
            system: Arc::new(Mutex::new(system)),
            pid,
            started: Instant::now(),
            peak_memory_mb: Arc::new(Mutex::new(0)),
            enabled,
        }
    }

    pub fn sample(&self) -> Option<ResourceSample> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid?)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let total_mb = system.total_memory() / 1024 / 1024;
        let memory_percent = if total_mb > 0 {
            (memory_mb as f32 / total_mb as f32) * 100.0
        } else {
            0.0
        };

        let mut peak = self.peak_memory_mb.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(ResourceSample {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            memory_percent,
            peak_memory_mb: *peak,
            elapsed: self.started.elapsed(),
        })
    }

    /// 記錄某階段結束時的資源使用量與任務進度
    pub fn log_phase(&self, phase: RunPhase, completed: usize, total: usize) {
        if let Some(sample) = self.sample() {
            tracing::info!("{}", sample.phase_line(phase, completed, total));
        }
    }

    pub fn log_final_stats(&self, tasks_completed: u64, tasks_per_second: f64) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "📊 Research run finished - {} tasks completed ({:.2} tasks/s), Elapsed: {:.2}s, Peak Memory: {}MB",
                tasks_completed,
                tasks_per_second,
                sample.elapsed.as_secs_f64(),
                sample.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_phase(&self, _phase: RunPhase, _completed: usize, _total: usize) {}

    pub fn log_final_stats(&self, _tasks_completed: u64, _tasks_per_second: f64) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(RunPhase::Initialize.label(), "Initialize");
        assert_eq!(RunPhase::Batch.label(), "Task batch");
        assert_eq!(RunPhase::Report.label(), "Performance report");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_phase_line_includes_task_progress() {
        let sample = ResourceSample {
            cpu_usage: 12.5,
            memory_mb: 48,
            memory_percent: 0.3,
            peak_memory_mb: 64,
            elapsed: Duration::from_millis(1500),
        };

        let line = sample.phase_line(RunPhase::Batch, 3, 5);
        assert!(line.starts_with("📊 Task batch [3/5 tasks]"));
        assert!(line.contains("CPU: 12.5%"));
        assert!(line.contains("Peak: 64MB"));
        assert!(line.contains("Elapsed: 1.50s"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample().is_none());
        monitor.log_phase(RunPhase::Initialize, 0, 4);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_enabled_monitor_tracks_peak() {
        let monitor = SystemMonitor::new(true);
        if let Some(first) = monitor.sample() {
            let second = monitor.sample().expect("sample available twice");
            assert!(second.peak_memory_mb >= first.memory_mb);
        }
    }
}
