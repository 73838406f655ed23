//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用的存储实现。所有并发敏感的操作都以单条 SQL 完成：
//!
//! - **history 去重写入**：`insert ... on conflict (sim_id, event_time) do nothing`
//! - **请求号分配**：`insert ... on conflict (sim_id) do update set count = count + 1 returning count`
//! - **命令登记**：`insert ... on conflict (sim_id, device_req_no) do nothing`，未插入时回读已存在的行
//! - **状态流转**：`update ... where state = $from`，以 `rows_affected` 判断是否流转
//!
//! ## 数据库模式要求
//!
//! - `history`：(sim_id, event_time) 主键，device_id 索引，hist_data 为 JSON 文本
//! - `devices`：device_id 主键，sim_id 唯一，terminal_settings 为 JSON 文本
//! - `request_counters`：sim_id 主键
//! - `remote_control_commands`：(sim_id, device_req_no) 主键，(state, issued_at) 索引
//!
//! 时间字段统一以 Unix 秒存为 bigint。
//!
//! ## 错误处理
//!
//! - `sqlx::Error` / `serde_json::Error` 自动转换为 `StorageError`
//! - 返回 `Option<T>` 表示"可能不存在"

pub mod command;
pub mod counter;
pub mod device;
pub mod history;

pub use command::*;
pub use counter::*;
pub use device::*;
pub use history::*;
