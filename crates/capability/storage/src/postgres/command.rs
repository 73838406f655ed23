//! Postgres 远程控制命令实现

use crate::error::StorageError;
use crate::models::CommandWriteResult;
use crate::traits::CommandStore;
use crate::validation::ensure_device_req_no;
use domain::{CommandState, RemoteControlCommand};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const COMMAND_COLUMNS: &str = "device_req_no, sim_id, do_no, issued_at, state, resolved_at";

pub struct PgCommandStore {
    pub pool: PgPool,
}

impl PgCommandStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn command_from_row(row: &PgRow) -> Result<RemoteControlCommand, StorageError> {
    let state: String = row.try_get("state")?;
    let state = CommandState::parse(&state)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown command state: {state}")))?;
    Ok(RemoteControlCommand {
        device_req_no: row.try_get("device_req_no")?,
        sim_id: row.try_get("sim_id")?,
        do_no: row.try_get("do_no")?,
        issued_at: row.try_get("issued_at")?,
        state,
        resolved_at: row.try_get("resolved_at")?,
    })
}

#[async_trait::async_trait]
impl CommandStore for PgCommandStore {
    async fn create_command_if_absent(
        &self,
        record: RemoteControlCommand,
    ) -> Result<CommandWriteResult, StorageError> {
        ensure_device_req_no(&record.sim_id, &record.device_req_no)?;
        let result = sqlx::query(
            "insert into remote_control_commands \
             (device_req_no, sim_id, do_no, issued_at, state, resolved_at) \
             values ($1, $2, $3, $4, $5, $6) \
             on conflict (sim_id, device_req_no) do nothing",
        )
        .bind(&record.device_req_no)
        .bind(&record.sim_id)
        .bind(record.do_no)
        .bind(record.issued_at)
        .bind(record.state.as_str())
        .bind(record.resolved_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(CommandWriteResult {
                record,
                inserted: true,
            });
        }
        let existing = self
            .find_latest_command(&record.sim_id, &record.device_req_no)
            .await?
            .ok_or_else(|| StorageError::Corrupt("command conflict without existing row".to_string()))?;
        Ok(CommandWriteResult {
            record: existing,
            inserted: false,
        })
    }

    async fn find_latest_command(
        &self,
        sim_id: &str,
        device_req_no: &str,
    ) -> Result<Option<RemoteControlCommand>, StorageError> {
        ensure_device_req_no(sim_id, device_req_no)?;
        let sql = format!(
            "select {} from remote_control_commands \
             where sim_id = $1 and device_req_no = $2 \
             order by issued_at desc \
             limit 1",
            COMMAND_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(sim_id)
            .bind(device_req_no)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(command_from_row).transpose()
    }

    async fn transition_command_state(
        &self,
        sim_id: &str,
        device_req_no: &str,
        from: CommandState,
        to: CommandState,
        at: i64,
    ) -> Result<bool, StorageError> {
        ensure_device_req_no(sim_id, device_req_no)?;
        let result = sqlx::query(
            "update remote_control_commands set state = $1, resolved_at = $2 \
             where sim_id = $3 and device_req_no = $4 and state = $5",
        )
        .bind(to.as_str())
        .bind(at)
        .bind(sim_id)
        .bind(device_req_no)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pending_commands(
        &self,
        issued_before: i64,
    ) -> Result<Vec<RemoteControlCommand>, StorageError> {
        let sql = format!(
            "select {} from remote_control_commands \
             where state = $1 and issued_at < $2 \
             order by issued_at asc",
            COMMAND_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(CommandState::Pending.as_str())
            .bind(issued_before)
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(command_from_row(row)?);
        }
        Ok(items)
    }
}
