//! 自动化触发：把 history 事件分类为自动化动作，并交给外部派发器。
//!
//! 分类是纯映射（见 [`classify`]），派发器是外部能力，
//! 其重试与失败策略不在本模块范围内。

mod classifier;

pub use classifier::{classify, classify_record};

use async_trait::async_trait;
use domain::{AutomationAction, DeviceInfo};
use fieldio_storage::{DeviceStore, HistoryStore};
use fieldio_telemetry::{record_action_dispatch_failure, record_action_dispatched};
use tracing::{info, warn};

/// 自动化链路错误。
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("dispatch error: {0}")]
    Dispatch(String),
}

/// 自动化动作派发器抽象。
#[async_trait]
pub trait AutomationDispatcher: Send + Sync {
    async fn dispatch(&self, action: &AutomationAction) -> Result<(), AutomationError>;
}

/// 空派发器（用于占位）。
#[derive(Debug, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl AutomationDispatcher for NoopDispatcher {
    async fn dispatch(&self, _action: &AutomationAction) -> Result<(), AutomationError> {
        Ok(())
    }
}

/// 逐个派发动作。派发失败只记录日志，不中断后续动作；返回成功数。
pub async fn dispatch_actions(
    dispatcher: &dyn AutomationDispatcher,
    actions: &[AutomationAction],
) -> usize {
    let mut dispatched = 0;
    for action in actions {
        match dispatcher.dispatch(action).await {
            Ok(()) => {
                record_action_dispatched();
                dispatched += 1;
                info!(
                    target: "fieldio.automation",
                    device_id = %action.device_id,
                    event_type = %action.event_type,
                    terminal_no = ?action.terminal_no,
                    event_detail = ?action.event_detail.map(|detail| detail.as_str()),
                    occurrence_flag = ?action.occurrence_flag,
                    "automation_action_dispatched"
                );
            }
            Err(err) => {
                record_action_dispatch_failure();
                warn!(
                    target: "fieldio.automation",
                    device_id = %action.device_id,
                    event_type = %action.event_type,
                    error = %err,
                    "automation_action_dispatch_failed"
                );
            }
        }
    }
    dispatched
}

/// 重新评估设备的全部已存 history。
///
/// 设备配置不存在时按未配置处理（di_change 不会产生动作）。
pub async fn classify_device_history(
    history_store: &dyn HistoryStore,
    device_store: &dyn DeviceStore,
    device_id: &str,
) -> Result<Vec<AutomationAction>, AutomationError> {
    let records = history_store
        .query_by_device(device_id)
        .await
        .map_err(|err| AutomationError::Storage(err.to_string()))?;
    let device = device_store
        .get_device(device_id)
        .await
        .map_err(|err| AutomationError::Storage(err.to_string()))?
        .unwrap_or_else(|| DeviceInfo {
            device_id: device_id.to_string(),
            ..DeviceInfo::default()
        });
    Ok(classify(&records, &device).collect())
}
