//! 存储层返回结构
//!
//! 领域对象（HistoryRecord、RemoteControlCommand、DeviceInfo）定义在 `domain` 中，
//! 这里只放存储操作特有的结果类型。

use domain::RemoteControlCommand;

/// 命令条件写入结果。
#[derive(Debug, Clone)]
pub struct CommandWriteResult {
    /// `inserted` 为 false 时是已存在的那条记录。
    pub record: RemoteControlCommand,
    pub inserted: bool,
}
