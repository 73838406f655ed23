//! 追踪初始化、调用 ID 与基础计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub frames_rejected: u64,
    pub dropped_duplicate: u64,
    pub history_written: u64,
    pub actions_dispatched: u64,
    pub action_dispatch_failure: u64,
    pub commands_issued: u64,
    pub responses_correlated: u64,
    pub responses_unknown: u64,
    pub commands_timed_out: u64,
}

/// 进程内计数器（单次调用内有效，不跨调用汇总）。
pub struct TelemetryMetrics {
    frames_received: AtomicU64,
    frames_rejected: AtomicU64,
    dropped_duplicate: AtomicU64,
    history_written: AtomicU64,
    actions_dispatched: AtomicU64,
    action_dispatch_failure: AtomicU64,
    commands_issued: AtomicU64,
    responses_correlated: AtomicU64,
    responses_unknown: AtomicU64,
    commands_timed_out: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            dropped_duplicate: AtomicU64::new(0),
            history_written: AtomicU64::new(0),
            actions_dispatched: AtomicU64::new(0),
            action_dispatch_failure: AtomicU64::new(0),
            commands_issued: AtomicU64::new(0),
            responses_correlated: AtomicU64::new(0),
            responses_unknown: AtomicU64::new(0),
            commands_timed_out: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            dropped_duplicate: self.dropped_duplicate.load(Ordering::Relaxed),
            history_written: self.history_written.load(Ordering::Relaxed),
            actions_dispatched: self.actions_dispatched.load(Ordering::Relaxed),
            action_dispatch_failure: self.action_dispatch_failure.load(Ordering::Relaxed),
            commands_issued: self.commands_issued.load(Ordering::Relaxed),
            responses_correlated: self.responses_correlated.load(Ordering::Relaxed),
            responses_unknown: self.responses_unknown.load(Ordering::Relaxed),
            commands_timed_out: self.commands_timed_out.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 invocation_id，用于串联一次调用内的日志。
pub fn new_invocation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录收到的上报报文数。
pub fn record_frame_received() {
    metrics().frames_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录解码/校验拒绝数（不含重复）。
pub fn record_frame_rejected() {
    metrics().frames_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录重复报文丢弃数。
pub fn record_dropped_duplicate() {
    metrics().dropped_duplicate.fetch_add(1, Ordering::Relaxed);
}

/// 记录 history 写入数。
pub fn record_history_written() {
    metrics().history_written.fetch_add(1, Ordering::Relaxed);
}

/// 记录自动化动作派发成功数。
pub fn record_action_dispatched() {
    metrics().actions_dispatched.fetch_add(1, Ordering::Relaxed);
}

/// 记录自动化动作派发失败数。
pub fn record_action_dispatch_failure() {
    metrics()
        .action_dispatch_failure
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录命令下发数。
pub fn record_command_issued() {
    metrics().commands_issued.fetch_add(1, Ordering::Relaxed);
}

/// 记录回执关联成功数。
pub fn record_response_correlated() {
    metrics()
        .responses_correlated
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录无法关联的回执数。
pub fn record_response_unknown() {
    metrics().responses_unknown.fetch_add(1, Ordering::Relaxed);
}

/// 记录超时流转数。
pub fn record_commands_timed_out(count: u64) {
    metrics()
        .commands_timed_out
        .fetch_add(count, Ordering::Relaxed);
}
