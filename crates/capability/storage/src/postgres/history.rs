//! Postgres history 实现

use crate::error::StorageError;
use crate::traits::HistoryStore;
use crate::validation::ensure_sim_id;
use domain::{HistData, HistoryRecord};
use sqlx::{PgPool, Row};

pub struct PgHistoryStore {
    pub pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl HistoryStore for PgHistoryStore {
    async fn put_if_absent(&self, record: &HistoryRecord) -> Result<bool, StorageError> {
        ensure_sim_id(&record.sim_id)?;
        let hist_data = serde_json::to_string(&record.hist_data)?;
        let result = sqlx::query(
            "insert into history (sim_id, event_time, device_id, hist_data) \
             values ($1, $2, $3, $4) \
             on conflict (sim_id, event_time) do nothing",
        )
        .bind(&record.sim_id)
        .bind(record.event_time as i64)
        .bind(&record.device_id)
        .bind(hist_data)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, sim_id: &str, event_time: u64) -> Result<u64, StorageError> {
        ensure_sim_id(sim_id)?;
        let row = sqlx::query(
            "select count(*) as total from history where sim_id = $1 and event_time = $2",
        )
        .bind(sim_id)
        .bind(event_time as i64)
        .fetch_one(&self.pool)
        .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }

    async fn query_by_device(&self, device_id: &str) -> Result<Vec<HistoryRecord>, StorageError> {
        let rows = sqlx::query(
            "select sim_id, event_time, device_id, hist_data \
             from history where device_id = $1 \
             order by event_time asc",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let event_time: i64 = row.try_get("event_time")?;
            let hist_data: Option<String> = row.try_get("hist_data")?;
            let hist_data = match hist_data {
                Some(text) => serde_json::from_str::<HistData>(&text)?,
                None => HistData::default(),
            };
            items.push(HistoryRecord {
                sim_id: row.try_get("sim_id")?,
                event_time: event_time.max(0) as u64,
                device_id: row.try_get("device_id")?,
                hist_data,
            });
        }
        Ok(items)
    }
}
