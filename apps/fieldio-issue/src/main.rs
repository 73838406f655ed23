//! 下发一条远程控制命令：分配请求号并登记 pending，标准输出打印 device_req_no。
//!
//! 报文的实际发送由外部传输层完成；回执经 ingest 关联，超时由 fieldio-sweeper 处理。

use clap::Parser;
use domain::now_epoch_seconds;
use fieldio_config::EngineConfig;
use fieldio_control::CommandService;
use fieldio_storage::{PgCommandStore, RequestCounterBackend, connect_pool};
use fieldio_telemetry::{init_tracing, new_invocation_id};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

/// FieldIO remote control command issuer
#[derive(Parser)]
#[command(name = "fieldio-issue")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SIM ID of the target device
    #[arg(long)]
    sim_id: String,

    /// DO terminal number
    #[arg(long)]
    do_no: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    let config = EngineConfig::from_env()?;
    init_tracing();

    // 命令表固定在 Postgres；计数器配置了 FIELDIO_REDIS_URL 时走 Redis
    let pool = connect_pool(config.require_database_url()?).await?;
    let counters = RequestCounterBackend::select(config.redis_url.as_deref(), pool.clone())?;
    let counter_backend = counters.name();
    let service = CommandService::new(Arc::new(counters), Arc::new(PgCommandStore::new(pool)));

    let span = info_span!(
        target: "fieldio.issue",
        "issue",
        invocation_id = %new_invocation_id(),
        sim_id = %cli.sim_id
    );
    async move {
        let command = service
            .issue(&cli.sim_id, cli.do_no, now_epoch_seconds())
            .await?;
        info!(
            target: "fieldio.issue",
            device_req_no = %command.device_req_no,
            do_no = command.do_no,
            counter_backend = counter_backend,
            "command_pending"
        );
        println!("{}", command.device_req_no);
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await
}
