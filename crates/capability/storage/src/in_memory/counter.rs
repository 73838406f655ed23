//! 请求计数器内存实现

use crate::error::StorageError;
use crate::traits::RequestCounterStore;
use crate::validation::ensure_sim_id;
use std::collections::HashMap;
use std::sync::Mutex;

/// 请求计数器内存存储
#[derive(Default)]
pub struct InMemoryRequestCounterStore {
    counters: Mutex<HashMap<String, i64>>,
}

impl InMemoryRequestCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RequestCounterStore for InMemoryRequestCounterStore {
    async fn increment(&self, sim_id: &str) -> Result<i64, StorageError> {
        ensure_sim_id(sim_id)?;
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        let count = counters.entry(sim_id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}
