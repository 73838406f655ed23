//! 设备配置内存实现

use crate::error::StorageError;
use crate::traits::DeviceStore;
use domain::DeviceInfo;
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备配置内存存储
#[derive(Default)]
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, DeviceInfo>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定设备列表初始化。
    pub fn with_devices(devices: impl IntoIterator<Item = DeviceInfo>) -> Self {
        let devices = devices
            .into_iter()
            .map(|device| (device.device_id.clone(), device))
            .collect();
        Self {
            devices: RwLock::new(devices),
        }
    }

    /// 新增或替换设备配置。
    pub fn upsert(&self, device: DeviceInfo) -> Result<(), StorageError> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        devices.insert(device.device_id.clone(), device);
        Ok(())
    }
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get_device(&self, device_id: &str) -> Result<Option<DeviceInfo>, StorageError> {
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(devices.get(device_id).cloned())
    }

    async fn find_device_by_sim(&self, sim_id: &str) -> Result<Option<DeviceInfo>, StorageError> {
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(devices
            .values()
            .find(|device| !device.sim_id.is_empty() && device.sim_id == sim_id)
            .cloned())
    }
}
