//! 请求计数器后端选择
//!
//! 配置了 Redis 时计数器放在 Redis（`INCR`），否则落在 PostgreSQL 的 `request_counters` 表。
//! 两种后端都是存储端原子自增，切换后端不改变请求号语义，但计数不会迁移。

use crate::error::StorageError;
use crate::postgres::PgRequestCounterStore;
use crate::redis::RedisRequestCounterStore;
use crate::traits::RequestCounterStore;
use sqlx::PgPool;

pub enum RequestCounterBackend {
    Redis(RedisRequestCounterStore),
    Postgres(PgRequestCounterStore),
}

impl RequestCounterBackend {
    /// 按配置选择：`redis_url` 存在时用 Redis，否则复用 Postgres 连接池。
    pub fn select(redis_url: Option<&str>, pool: PgPool) -> Result<Self, StorageError> {
        match redis_url {
            Some(url) => Ok(Self::Redis(RedisRequestCounterStore::connect(url)?)),
            None => Ok(Self::Postgres(PgRequestCounterStore::new(pool))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Postgres(_) => "postgres",
        }
    }
}

#[async_trait::async_trait]
impl RequestCounterStore for RequestCounterBackend {
    async fn increment(&self, sim_id: &str) -> Result<i64, StorageError> {
        match self {
            Self::Redis(store) => store.increment(sim_id).await,
            Self::Postgres(store) => store.increment(sim_id).await,
        }
    }
}
