//! 命令超时巡检：执行一次 sweep 后退出，调用节奏交给外部调度（cron / systemd timer）。

use domain::now_epoch_seconds;
use fieldio_config::EngineConfig;
use fieldio_control::CommandLifecycleTracker;
use fieldio_storage::{PgCommandStore, connect_pool};
use fieldio_telemetry::{init_tracing, metrics, new_invocation_id};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = EngineConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // Postgres 命令存储（需先执行 migrations）
    let pool = connect_pool(config.require_database_url()?).await?;
    let tracker = CommandLifecycleTracker::new(Arc::new(PgCommandStore::new(pool)));

    let span = info_span!(
        target: "fieldio.sweeper",
        "sweep",
        invocation_id = %new_invocation_id()
    );
    async move {
        let now = now_epoch_seconds();
        let timed_out = tracker
            .sweep_timeouts(now, config.command_deadline)
            .await?;
        info!(
            target: "fieldio.sweeper",
            now = now,
            deadline_seconds = config.command_deadline.as_secs(),
            timed_out = timed_out.len(),
            commands_timed_out_total = metrics().snapshot().commands_timed_out,
            "sweep_completed"
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await
}
