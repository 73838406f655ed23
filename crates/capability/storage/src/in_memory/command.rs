//! 远程控制命令内存实现

use crate::error::StorageError;
use crate::models::CommandWriteResult;
use crate::traits::CommandStore;
use crate::validation::ensure_device_req_no;
use domain::{CommandState, RemoteControlCommand};
use std::sync::RwLock;

/// 命令内存存储（只追加，不删除）
#[derive(Default)]
pub struct InMemoryCommandStore {
    commands: RwLock<Vec<RemoteControlCommand>>,
}

impl InMemoryCommandStore {
    /// 创建新的命令存储
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CommandStore for InMemoryCommandStore {
    async fn create_command_if_absent(
        &self,
        record: RemoteControlCommand,
    ) -> Result<CommandWriteResult, StorageError> {
        ensure_device_req_no(&record.sim_id, &record.device_req_no)?;
        let mut commands = self
            .commands
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if let Some(existing) = commands.iter().find(|item| {
            item.sim_id == record.sim_id && item.device_req_no == record.device_req_no
        }) {
            return Ok(CommandWriteResult {
                record: existing.clone(),
                inserted: false,
            });
        }
        commands.push(record.clone());
        Ok(CommandWriteResult {
            record,
            inserted: true,
        })
    }

    async fn find_latest_command(
        &self,
        sim_id: &str,
        device_req_no: &str,
    ) -> Result<Option<RemoteControlCommand>, StorageError> {
        ensure_device_req_no(sim_id, device_req_no)?;
        let commands = self
            .commands
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        // 同一 issued_at 时取后写入的一条
        Ok(commands
            .iter()
            .filter(|item| item.sim_id == sim_id && item.device_req_no == device_req_no)
            .max_by_key(|item| item.issued_at)
            .cloned())
    }

    async fn transition_command_state(
        &self,
        sim_id: &str,
        device_req_no: &str,
        from: CommandState,
        to: CommandState,
        at: i64,
    ) -> Result<bool, StorageError> {
        ensure_device_req_no(sim_id, device_req_no)?;
        let mut commands = self
            .commands
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let latest = commands
            .iter_mut()
            .filter(|item| item.sim_id == sim_id && item.device_req_no == device_req_no)
            .max_by_key(|item| item.issued_at);
        let Some(command) = latest else {
            return Ok(false);
        };
        if command.state != from {
            return Ok(false);
        }
        command.state = to;
        command.resolved_at = Some(at);
        Ok(true)
    }

    async fn list_pending_commands(
        &self,
        issued_before: i64,
    ) -> Result<Vec<RemoteControlCommand>, StorageError> {
        let commands = self
            .commands
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut items: Vec<RemoteControlCommand> = commands
            .iter()
            .filter(|item| item.state == CommandState::Pending && item.issued_at < issued_before)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.issued_at);
        Ok(items)
    }
}
