//! 重复报文判定。
//!
//! 重传的报文携带完全相同的 `event_time`，因此按 `(sim_id, event_time)` 精确匹配即可，
//! 不做时间窗口推断，也不负责 history 的淘汰。

use fieldio_storage::{HistoryStore, StorageError};
use std::sync::Arc;

#[derive(Clone)]
pub struct DeduplicationGate {
    history_store: Arc<dyn HistoryStore>,
}

impl DeduplicationGate {
    pub fn new(history_store: Arc<dyn HistoryStore>) -> Self {
        Self { history_store }
    }

    /// 已存在同键 history 即视为重复。
    pub async fn is_duplicate(&self, sim_id: &str, event_time: u64) -> Result<bool, StorageError> {
        let count = self.history_store.count(sim_id, event_time).await?;
        Ok(count > 0)
    }
}
