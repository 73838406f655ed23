//! history 内存实现

use crate::error::StorageError;
use crate::traits::HistoryStore;
use crate::validation::ensure_sim_id;
use domain::HistoryRecord;
use std::sync::RwLock;

/// history 内存存储
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前记录总数（测试辅助）。
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn put_if_absent(&self, record: &HistoryRecord) -> Result<bool, StorageError> {
        ensure_sim_id(&record.sim_id)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let exists = records
            .iter()
            .any(|item| item.sim_id == record.sim_id && item.event_time == record.event_time);
        if exists {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn count(&self, sim_id: &str, event_time: u64) -> Result<u64, StorageError> {
        ensure_sim_id(sim_id)?;
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let count = records
            .iter()
            .filter(|item| item.sim_id == sim_id && item.event_time == event_time)
            .count();
        Ok(count as u64)
    }

    async fn query_by_device(&self, device_id: &str) -> Result<Vec<HistoryRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut items: Vec<HistoryRecord> = records
            .iter()
            .filter(|item| item.device_id == device_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.event_time);
        Ok(items)
    }
}
