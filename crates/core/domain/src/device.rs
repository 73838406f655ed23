//! 设备配置（只读）。
//!
//! 配置来自外部存储，字段缺失一律按缺省值处理（`None` / `0` / `""` / 空列表），
//! 解析本身不应因可选字段缺失而失败。

use serde::{Deserialize, Serialize};

/// DI 端子设置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiSetting {
    pub terminal_no: i64,
    pub di_on_name: String,
    pub di_off_name: String,
}

/// DO 端子设置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoSetting {
    pub terminal_no: i64,
    pub do_name: String,
}

/// 端子设置集合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    pub di_list: Vec<DiSetting>,
    pub do_list: Vec<DoSetting>,
}

/// 设备信息。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub device_id: String,
    pub sim_id: String,
    pub terminal_settings: Option<TerminalSettings>,
}

impl DeviceInfo {
    /// DI 端子列表；未配置时为空。
    pub fn di_list(&self) -> &[DiSetting] {
        self.terminal_settings
            .as_ref()
            .map(|settings| settings.di_list.as_slice())
            .unwrap_or(&[])
    }
}
