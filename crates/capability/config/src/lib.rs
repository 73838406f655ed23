//! 引擎运行配置加载。
//!
//! 配置在启动时加载一次，之后以不可变值传给各组件（无全局状态）。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 上报时间校验窗口（秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub past_seconds: u64,
    pub future_seconds: u64,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            past_seconds: 86_400,
            future_seconds: 300,
        }
    }
}

/// 引擎运行配置。
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub event_time_window: TimeWindow,
    /// 等待设备回执的期限，超过后由巡检流转为 `timed_out`。
    pub command_deadline: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            event_time_window: TimeWindow::default(),
            command_deadline: Duration::from_secs(60),
        }
    }
}

impl EngineConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let database_url = read_optional("FIELDIO_DATABASE_URL");
        let redis_url = read_optional("FIELDIO_REDIS_URL");
        let past_seconds = read_u64_with_default(
            "FIELDIO_PAST_WINDOW_SECONDS",
            defaults.event_time_window.past_seconds,
        )?;
        let future_seconds = read_u64_with_default(
            "FIELDIO_FUTURE_WINDOW_SECONDS",
            defaults.event_time_window.future_seconds,
        )?;
        let deadline_seconds = read_u64_with_default(
            "FIELDIO_COMMAND_DEADLINE_SECONDS",
            defaults.command_deadline.as_secs(),
        )?;

        Ok(Self {
            database_url,
            redis_url,
            event_time_window: TimeWindow {
                past_seconds,
                future_seconds,
            },
            command_deadline: Duration::from_secs(deadline_seconds),
        })
    }

    /// 取数据库 URL（二进制运行时必需）。
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("FIELDIO_DATABASE_URL".to_string()))
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    parse_u64(key, value)
}

fn parse_u64(key: &str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
