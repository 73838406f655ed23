//! 内存存储实现模块
//!
//! 仅用于本地演示和测试。每个操作在单次加锁内完成，
//! 以模拟真实存储的条件写入与原子自增语义。
//!
//! 包含以下实现：
//! - HistoryStore: InMemoryHistoryStore
//! - DeviceStore: InMemoryDeviceStore
//! - RequestCounterStore: InMemoryRequestCounterStore
//! - CommandStore: InMemoryCommandStore

pub mod command;
pub mod counter;
pub mod device;
pub mod history;

pub use command::*;
pub use counter::*;
pub use device::*;
pub use history::*;
