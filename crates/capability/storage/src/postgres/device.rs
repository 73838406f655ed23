//! Postgres 设备配置实现（只读）

use crate::error::StorageError;
use crate::traits::DeviceStore;
use domain::{DeviceInfo, TerminalSettings};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgDeviceStore {
    pub pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 终端设置解析失败时按未配置处理，分类器不应因配置异常而失败。
fn device_from_row(row: &PgRow) -> Result<DeviceInfo, StorageError> {
    let terminal_settings: Option<String> = row.try_get("terminal_settings")?;
    let terminal_settings = terminal_settings
        .and_then(|text| serde_json::from_str::<TerminalSettings>(&text).ok());
    let sim_id: Option<String> = row.try_get("sim_id")?;
    Ok(DeviceInfo {
        device_id: row.try_get("device_id")?,
        sim_id: sim_id.unwrap_or_default(),
        terminal_settings,
    })
}

#[async_trait::async_trait]
impl DeviceStore for PgDeviceStore {
    async fn get_device(&self, device_id: &str) -> Result<Option<DeviceInfo>, StorageError> {
        let row = sqlx::query(
            "select device_id, sim_id, terminal_settings from devices where device_id = $1",
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(device_from_row).transpose()
    }

    async fn find_device_by_sim(&self, sim_id: &str) -> Result<Option<DeviceInfo>, StorageError> {
        let row = sqlx::query(
            "select device_id, sim_id, terminal_settings from devices where sim_id = $1",
        )
        .bind(sim_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(device_from_row).transpose()
    }
}
