use serde::{Deserialize, Serialize};

/// 合法的设备类型。
pub const DEVICE_TYPES: [u16; 3] = [1, 2, 3];

/// 远程控制回执报文（携带 request_no）。
pub const MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE: u16 = 0x8002;

/// 合法的报文类型。
pub const MESSAGE_TYPES: [u16; 4] = [0x0001, 0x0011, 0x0012, MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE];

/// 解码后的上报报文（不落库）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFrame {
    pub total_length: u16,
    pub device_type: u16,
    pub protocol_version: u16,
    pub message_type: u16,
    /// 4 字节请求号的小写十六进制表示，仅 `0x8002` 报文携带。
    pub request_no: Option<String>,
    /// 事件发生时间（Unix 秒）。
    pub event_time: u64,
    /// `event_time` 之后的业务负载，解码器不解释。
    pub payload: Vec<u8>,
}

impl TelemetryFrame {
    /// 是否为远程控制回执。
    pub fn is_remote_control_response(&self) -> bool {
        self.message_type == MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE
    }
}

/// history 明细。字段均可缺省。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistData {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub terminal_no: Option<i64>,
    #[serde(default)]
    pub terminal_state_name: Option<String>,
    #[serde(default)]
    pub occurrence_flag: Option<i64>,
}

/// 已接收事件的历史记录，以 `(sim_id, event_time)` 唯一。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub sim_id: String,
    pub event_time: u64,
    pub device_id: String,
    pub hist_data: HistData,
}

/// di_change 的开闭状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDetail {
    Open,
    Close,
}

impl EventDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }
}

/// 交给自动化派发器的触发动作。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomationAction {
    pub device_id: String,
    pub event_type: String,
    pub terminal_no: Option<i64>,
    pub event_detail: Option<EventDetail>,
    pub occurrence_flag: Option<i64>,
}
