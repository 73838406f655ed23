//! 存储接口 Trait 定义
//!
//! - HistoryStore：history 记录（条件写入 + 计数 + 按设备查询）
//! - DeviceStore：设备配置（只读）
//! - RequestCounterStore：按 SIM 的请求计数器（原子自增）
//! - CommandStore：远程控制命令（条件写入 + 最新一条查询 + 条件状态流转）
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发
//! - 需要并发安全的操作必须由实现方以单次原子操作完成

use crate::error::StorageError;
use crate::models::CommandWriteResult;
use async_trait::async_trait;
use domain::{CommandState, DeviceInfo, HistoryRecord, RemoteControlCommand};

/// history 存储接口
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// `(sim_id, event_time)` 不存在时写入，返回是否写入
    async fn put_if_absent(&self, record: &HistoryRecord) -> Result<bool, StorageError>;

    /// 统计 `(sim_id, event_time)` 的记录数
    async fn count(&self, sim_id: &str, event_time: u64) -> Result<u64, StorageError>;

    /// 查询设备的全部 history，按 event_time 升序
    async fn query_by_device(&self, device_id: &str) -> Result<Vec<HistoryRecord>, StorageError>;
}

/// 设备配置存储接口（只读）
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// 按设备 ID 查询
    async fn get_device(&self, device_id: &str) -> Result<Option<DeviceInfo>, StorageError>;

    /// 按 SIM ID 查询所属设备
    async fn find_device_by_sim(&self, sim_id: &str) -> Result<Option<DeviceInfo>, StorageError>;
}

/// 请求计数器存储接口
#[async_trait]
pub trait RequestCounterStore: Send + Sync {
    /// 原子地将 `sim_id` 的计数 +1 并返回新值（不存在时从 0 开始）
    async fn increment(&self, sim_id: &str) -> Result<i64, StorageError>;
}

/// 远程控制命令存储接口
#[async_trait]
pub trait CommandStore: Send + Sync {
    /// `(sim_id, device_req_no)` 不存在时写入
    async fn create_command_if_absent(
        &self,
        record: RemoteControlCommand,
    ) -> Result<CommandWriteResult, StorageError>;

    /// 查询键对应的最新一条命令（issued_at 降序取 1）
    async fn find_latest_command(
        &self,
        sim_id: &str,
        device_req_no: &str,
    ) -> Result<Option<RemoteControlCommand>, StorageError>;

    /// 仅当当前状态为 `from` 时流转到 `to`，返回是否流转
    async fn transition_command_state(
        &self,
        sim_id: &str,
        device_req_no: &str,
        from: CommandState,
        to: CommandState,
        at: i64,
    ) -> Result<bool, StorageError>;

    /// 列出 `issued_at < issued_before` 且仍为 pending 的命令
    async fn list_pending_commands(
        &self,
        issued_before: i64,
    ) -> Result<Vec<RemoteControlCommand>, StorageError>;
}
