//! 远程控制命令生命周期。
//!
//! ```text
//! issue ──► CommandSequencer.allocate_request_no ──► CommandLifecycleTracker.record_issued (pending)
//!                                                          │
//!                     ┌────────────────────────────────────┤
//!                     ▼                                    ▼
//!      correlate_response (回执报文)              sweep_timeouts (外部定时触发)
//!          pending → responded                       pending → timed_out
//! ```
//!
//! 所有状态都在存储中，命令下发与回执可以发生在完全不同的调用里。

mod sequencer;
mod tracker;

pub use sequencer::{CommandSequencer, RequestNo};
pub use tracker::CommandLifecycleTracker;

use domain::RemoteControlCommand;
use fieldio_storage::{CommandStore, RequestCounterStore};
use fieldio_telemetry::record_command_issued;
use std::sync::Arc;
use tracing::info;

/// 控制链路错误。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("storage error: {0}")]
    Storage(String),
    /// 请求号冲突：计数器原子性被破坏，不重试。
    #[error("duplicate request no {device_req_no} for sim {sim_id}")]
    DuplicateRequestNo {
        sim_id: String,
        device_req_no: String,
    },
    /// 计数器超出 4 字节请求号空间，该 SIM 无法再下发命令。
    #[error("request no space exhausted for sim {sim_id} at count {count}")]
    RequestNoExhausted { sim_id: String, count: i64 },
    #[error("unknown request no {device_req_no} for sim {sim_id}")]
    UnknownRequest {
        sim_id: String,
        device_req_no: String,
    },
}

/// 命令服务（分配请求号 + 登记 pending）。
#[derive(Clone)]
pub struct CommandService {
    sequencer: CommandSequencer,
    tracker: CommandLifecycleTracker,
}

impl CommandService {
    pub fn new(
        counter_store: Arc<dyn RequestCounterStore>,
        command_store: Arc<dyn CommandStore>,
    ) -> Self {
        Self {
            sequencer: CommandSequencer::new(counter_store),
            tracker: CommandLifecycleTracker::new(command_store),
        }
    }

    pub fn tracker(&self) -> &CommandLifecycleTracker {
        &self.tracker
    }

    /// 向 `sim_id` 所属设备的 `do_no` 端子下发远程控制命令，返回 pending 命令。
    pub async fn issue(
        &self,
        sim_id: &str,
        do_no: i64,
        issued_at: i64,
    ) -> Result<RemoteControlCommand, ControlError> {
        let request_no = self.sequencer.allocate_request_no(sim_id).await?;
        let command = self
            .tracker
            .record_issued(sim_id, &request_no.device_req_no, do_no, issued_at)
            .await?;
        record_command_issued();
        info!(
            target: "fieldio.control",
            sim_id = %command.sim_id,
            device_req_no = %command.device_req_no,
            request_count = request_no.count,
            do_no = command.do_no,
            issued_at = command.issued_at,
            "command_issued"
        );
        Ok(command)
    }
}
