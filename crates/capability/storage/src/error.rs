//! 存储层错误类型
//!
//! 存储错误视为暂时性故障，原样上抛给调用方，引擎内部不重试。

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    /// hist_data / terminal_settings 的 JSON 文本无法解析
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("in-memory store lock poisoned")]
    LockPoisoned,
    #[error("{0} required")]
    MissingKey(&'static str),
    /// 库中数据不符合约束（未知状态值等）
    #[error("corrupt row: {0}")]
    Corrupt(String),
}
