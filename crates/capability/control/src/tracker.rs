//! 命令状态机：`pending → responded` 或 `pending → timed_out`，终态不可回退。

use crate::ControlError;
use domain::{CommandState, RemoteControlCommand};
use fieldio_storage::CommandStore;
use fieldio_telemetry::{record_commands_timed_out, record_response_correlated};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CommandLifecycleTracker {
    command_store: Arc<dyn CommandStore>,
}

impl CommandLifecycleTracker {
    pub fn new(command_store: Arc<dyn CommandStore>) -> Self {
        Self { command_store }
    }

    /// 登记已下发命令（pending）。键已存在时返回 `DuplicateRequestNo`。
    pub async fn record_issued(
        &self,
        sim_id: &str,
        device_req_no: &str,
        do_no: i64,
        issued_at: i64,
    ) -> Result<RemoteControlCommand, ControlError> {
        let record = RemoteControlCommand {
            device_req_no: device_req_no.to_string(),
            sim_id: sim_id.to_string(),
            do_no,
            issued_at,
            state: CommandState::Pending,
            resolved_at: None,
        };
        let written = self
            .command_store
            .create_command_if_absent(record)
            .await
            .map_err(storage_error)?;
        if !written.inserted {
            warn!(
                target: "fieldio.control",
                sim_id = %sim_id,
                device_req_no = %device_req_no,
                existing_state = written.record.state.as_str(),
                "command_request_no_collision"
            );
            return Err(ControlError::DuplicateRequestNo {
                sim_id: sim_id.to_string(),
                device_req_no: device_req_no.to_string(),
            });
        }
        Ok(written.record)
    }

    /// 关联设备回执。
    ///
    /// pending 的命令流转为 responded；已超时的命令保持 timed_out 原样返回，
    /// 与超时巡检并发时以存储中的条件更新结果为准。
    pub async fn correlate_response(
        &self,
        sim_id: &str,
        device_req_no: &str,
        at: i64,
    ) -> Result<RemoteControlCommand, ControlError> {
        let command = self.find_latest(sim_id, device_req_no).await?;
        match command.state {
            CommandState::Pending => {}
            CommandState::TimedOut => {
                info!(
                    target: "fieldio.control",
                    sim_id = %sim_id,
                    device_req_no = %device_req_no,
                    issued_at = command.issued_at,
                    "late_response_after_timeout"
                );
                return Ok(command);
            }
            CommandState::Responded => {
                info!(
                    target: "fieldio.control",
                    sim_id = %sim_id,
                    device_req_no = %device_req_no,
                    "response_already_correlated"
                );
                return Ok(command);
            }
        }

        let transitioned = self
            .command_store
            .transition_command_state(
                sim_id,
                device_req_no,
                CommandState::Pending,
                CommandState::Responded,
                at,
            )
            .await
            .map_err(storage_error)?;
        if !transitioned {
            // 期间被巡检或另一条回执抢先流转
            return self.find_latest(sim_id, device_req_no).await;
        }

        record_response_correlated();
        info!(
            target: "fieldio.control",
            sim_id = %sim_id,
            device_req_no = %device_req_no,
            latency_seconds = at - command.issued_at,
            "command_responded"
        );
        Ok(RemoteControlCommand {
            state: CommandState::Responded,
            resolved_at: Some(at),
            ..command
        })
    }

    /// 将 `issued_at + deadline < now` 的 pending 命令流转为 timed_out。
    ///
    /// 只返回本次巡检实际流转的命令。调用节奏由外部决定。
    pub async fn sweep_timeouts(
        &self,
        now: i64,
        deadline: Duration,
    ) -> Result<Vec<RemoteControlCommand>, ControlError> {
        let deadline_seconds = i64::try_from(deadline.as_secs()).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(deadline_seconds);
        let candidates = self
            .command_store
            .list_pending_commands(cutoff)
            .await
            .map_err(storage_error)?;

        let mut timed_out = Vec::new();
        for command in candidates {
            let transitioned = self
                .command_store
                .transition_command_state(
                    &command.sim_id,
                    &command.device_req_no,
                    CommandState::Pending,
                    CommandState::TimedOut,
                    now,
                )
                .await
                .map_err(storage_error)?;
            if !transitioned {
                continue;
            }
            info!(
                target: "fieldio.control",
                sim_id = %command.sim_id,
                device_req_no = %command.device_req_no,
                issued_at = command.issued_at,
                deadline_seconds = deadline_seconds,
                "command_timed_out"
            );
            timed_out.push(RemoteControlCommand {
                state: CommandState::TimedOut,
                resolved_at: Some(now),
                ..command
            });
        }
        record_commands_timed_out(timed_out.len() as u64);
        Ok(timed_out)
    }

    async fn find_latest(
        &self,
        sim_id: &str,
        device_req_no: &str,
    ) -> Result<RemoteControlCommand, ControlError> {
        self.command_store
            .find_latest_command(sim_id, device_req_no)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| ControlError::UnknownRequest {
                sim_id: sim_id.to_string(),
                device_req_no: device_req_no.to_string(),
            })
    }
}

fn storage_error(err: fieldio_storage::StorageError) -> ControlError {
    ControlError::Storage(err.to_string())
}
