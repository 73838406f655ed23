//! Redis 请求计数器实现
//!
//! `INCR` 在 Redis 端原子执行，不存在的键按 0 起算，
//! 满足并发分配请求号不重复的要求。

use crate::error::StorageError;
use crate::traits::RequestCounterStore;
use crate::validation::ensure_sim_id;
use ::redis::AsyncCommands;

fn request_counter_key(prefix: &str, sim_id: &str) -> String {
    format!("{}:sim:{}:request_count", prefix, sim_id)
}

/// Redis 请求计数器存储
pub struct RedisRequestCounterStore {
    client: ::redis::Client,
    key_prefix: String,
}

impl RedisRequestCounterStore {
    pub fn new(client: ::redis::Client) -> Self {
        Self {
            client,
            key_prefix: "fieldio".to_string(),
        }
    }

    pub fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client = ::redis::Client::open(redis_url)?;
        Ok(Self::new(client))
    }

    /// 自定义键前缀（多套环境共用一个 Redis 时使用）。
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

#[async_trait::async_trait]
impl RequestCounterStore for RedisRequestCounterStore {
    async fn increment(&self, sim_id: &str) -> Result<i64, StorageError> {
        ensure_sim_id(sim_id)?;
        let mut connection = self.client.get_multiplexed_tokio_connection().await?;
        let count: i64 = connection
            .incr(request_counter_key(&self.key_prefix, sim_id), 1)
            .await?;
        Ok(count)
    }
}
