//! 编解码错误类型定义

/// 报文拒绝原因。数值码（1–5）对外保持稳定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// 声明长度与实际不符，或不足以容纳报文字段
    #[error("frame length mismatch")]
    FrameLength,

    /// 未知设备类型
    #[error("unknown device type")]
    DeviceType,

    /// 未知报文类型
    #[error("unknown message type")]
    MessageType,

    /// 事件时间不在接收时间窗口内
    #[error("event time out of window")]
    EventTimeOutOfWindow,

    /// 同一 `(sim_id, event_time)` 已被接收
    #[error("duplicate frame")]
    Duplicate,
}

impl DecodeError {
    /// 对外的数值错误码。
    pub fn code(&self) -> u8 {
        match self {
            Self::FrameLength => 1,
            Self::DeviceType => 2,
            Self::MessageType => 3,
            Self::EventTimeOutOfWindow => 4,
            Self::Duplicate => 5,
        }
    }
}

/// 编码错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// 报文总长超出 2 字节长度字段
    #[error("frame of {0} bytes exceeds the u16 length field")]
    FrameTooLarge(usize),
}
