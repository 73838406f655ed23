//! # 上报报文解码模块
//!
//! 将设备上报的原始字节解析为 [`TelemetryFrame`](domain::TelemetryFrame)，并按固定顺序校验。
//!
//! ## 报文格式
//!
//! 所有多字节整数均为无符号大端：
//!
//! ```text
//! +--------+-------------+---------+--------------+---------------+------------+---------+
//! | length | device_type | version | message_type | request_no    | event_time | payload |
//! |   2    |      2      |    2    |      2       | 4 (仅 0x8002) |     8      |   ...   |
//! +--------+-------------+---------+--------------+---------------+------------+---------+
//! ```
//!
//! ## 校验顺序
//!
//! 1. 长度（`length` 与实际字节数一致且不少于 8 字节）
//! 2. 设备类型
//! 3. 报文类型
//! 4. 事件时间窗口
//! 5. 重复检查（由 ingest 通过 history 存储完成，共用 [`DecodeError`]）

mod decoder;
mod error;

pub use decoder::{PacketDecoder, encode, request_no_from_bytes};
pub use error::{DecodeError, EncodeError};
