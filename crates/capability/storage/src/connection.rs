//! 数据库连接管理
//!
//! 提供 PostgreSQL 连接池初始化。引擎以短生命周期调用运行，
//! 每次调用建一个小连接池即可。

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// 默认最大连接数
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// 建立 Postgres 连接池（默认最大连接数）
pub async fn connect_pool(database_url: &str) -> Result<PgPool, StorageError> {
    connect_pool_with(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// 建立 Postgres 连接池
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `max_connections`：最大连接数，至少为 1
pub async fn connect_pool_with(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    Ok(pool)
}
