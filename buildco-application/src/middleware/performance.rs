use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{BoxAnySend, CommandCall, CommandMiddleware, Next};
use crate::error::AppResult;

/// 一次命令分发的耗时指标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMetric {
    pub command: &'static str,
    pub duration: Duration,
    pub success: bool,
    pub slow: bool,
}

/// 指标接收端；`record` 在 drop 路径上调用，必须是同步且不会 panic 的
pub trait MetricsSink: Send + Sync {
    fn record(&self, metric: CommandMetric);
}

/// 以 tracing 事件输出指标
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&self, metric: CommandMetric) {
        tracing::debug!(
            command.name = metric.command,
            duration.ms = metric.duration.as_millis() as u64,
            success = metric.success,
            slow = metric.slow,
            "command metric"
        );
    }
}

/// 单个命令类型的累计统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    pub count: u64,
    pub failures: u64,
    pub slow: u64,
    pub total_ms: u64,
}

impl CommandStats {
    pub fn average_ms(&self) -> u64 {
        self.total_ms.checked_div(self.count).unwrap_or(0)
    }
}

/// 进程内累计指标，按命令名称聚合
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    stats: DashMap<&'static str, CommandStats>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, command: &str) -> Option<CommandStats> {
        self.stats.get(command).map(|s| *s)
    }

    /// 全部命令的统计（按名称排序）
    pub fn snapshot(&self) -> Vec<(&'static str, CommandStats)> {
        let mut all: Vec<_> = self.stats.iter().map(|e| (*e.key(), *e.value())).collect();
        all.sort_unstable_by_key(|(name, _)| *name);
        all
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record(&self, metric: CommandMetric) {
        let mut entry = self.stats.entry(metric.command).or_default();
        entry.count += 1;
        entry.total_ms += metric.duration.as_millis() as u64;
        if !metric.success {
            entry.failures += 1;
        }
        if metric.slow {
            entry.slow += 1;
        }
    }
}

/// 记录命令耗时：每次分发恰好记录一次（包括失败与被取消的分发）
pub struct PerformanceMiddleware {
    sink: Arc<dyn MetricsSink>,
    slow_threshold: Duration,
}

impl PerformanceMiddleware {
    pub fn new(sink: Arc<dyn MetricsSink>, slow_threshold: Duration) -> Self {
        Self {
            sink,
            slow_threshold,
        }
    }
}

/// 在 drop 时上报；future 被取消时以失败计
struct MetricGuard {
    sink: Arc<dyn MetricsSink>,
    command: &'static str,
    started: Instant,
    slow_threshold: Duration,
    success: bool,
}

impl Drop for MetricGuard {
    fn drop(&mut self) {
        let duration = self.started.elapsed();
        let slow = duration > self.slow_threshold;
        if slow {
            tracing::warn!(
                command.name = self.command,
                duration.ms = duration.as_millis() as u64,
                threshold.ms = self.slow_threshold.as_millis() as u64,
                "slow command"
            );
        }
        self.sink.record(CommandMetric {
            command: self.command,
            duration,
            success: self.success,
            slow,
        });
    }
}

#[async_trait]
impl CommandMiddleware for PerformanceMiddleware {
    fn name(&self) -> &'static str {
        "performance"
    }

    async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend> {
        let mut guard = MetricGuard {
            sink: self.sink.clone(),
            command: call.name,
            started: Instant::now(),
            slow_threshold: self.slow_threshold,
            success: false,
        };

        let out = next.run(call).await;
        guard.success = out.is_ok();
        drop(guard);

        out
    }
}
