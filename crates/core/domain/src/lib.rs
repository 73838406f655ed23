pub mod command;
pub mod data;
pub mod device;

pub use command::{CommandState, RemoteControlCommand};
pub use data::{
    AutomationAction, EventDetail, HistData, HistoryRecord, TelemetryFrame, DEVICE_TYPES,
    MESSAGE_TYPES, MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE,
};
pub use device::{DeviceInfo, DiSetting, DoSetting, TerminalSettings};

/// 当前 Unix 时间（秒）。
pub fn now_epoch_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
