//! Postgres 请求计数器实现

use crate::error::StorageError;
use crate::traits::RequestCounterStore;
use crate::validation::ensure_sim_id;
use sqlx::{PgPool, Row};

pub struct PgRequestCounterStore {
    pub pool: PgPool,
}

impl PgRequestCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RequestCounterStore for PgRequestCounterStore {
    async fn increment(&self, sim_id: &str) -> Result<i64, StorageError> {
        ensure_sim_id(sim_id)?;
        // 单条语句完成自增，行锁保证并发分配不重复
        let row = sqlx::query(
            "insert into request_counters (sim_id, count) values ($1, 1) \
             on conflict (sim_id) do update set count = request_counters.count + 1 \
             returning count",
        )
        .bind(sim_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }
}
