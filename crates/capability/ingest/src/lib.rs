//! 上报接入流水线。
//!
//! ```text
//! raw bytes ─► PacketDecoder (1–4) ─► DeduplicationGate (5) ─► 0x8002: correlate_response
//!                                                                   │
//!                                                                   ▼
//!                       AutomationClassifier ◄── history put_if_absent
//!                               │
//!                               ▼
//!                          dispatcher
//! ```
//!
//! 被拒绝的报文不写 history；派发失败与未知回执只记录日志，不影响接入结果。

mod dedup;

pub use dedup::DeduplicationGate;

use domain::{AutomationAction, HistData, HistoryRecord, RemoteControlCommand, TelemetryFrame};
use fieldio_automation::{AutomationDispatcher, classify, dispatch_actions};
use fieldio_config::EngineConfig;
use fieldio_control::{CommandLifecycleTracker, ControlError};
use fieldio_protocol::{DecodeError, PacketDecoder};
use fieldio_storage::{CommandStore, DeviceStore, HistoryStore};
use fieldio_telemetry::{
    new_invocation_id, record_dropped_duplicate, record_frame_received, record_frame_rejected,
    record_history_written, record_response_unknown,
};
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 解码/校验拒绝（含重复），数值码见 [`DecodeError::code`]
    #[error("frame rejected: {0}")]
    Rejected(#[from] DecodeError),
    #[error("no device registered for sim {0}")]
    UnknownDevice(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl IngestError {
    /// 拒绝码（1–5）；非校验类错误返回 None。
    pub fn reject_code(&self) -> Option<u8> {
        match self {
            Self::Rejected(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// 外部传输层交来的一帧。
#[derive(Debug, Clone)]
pub struct InboundFrame {
    pub sim_id: String,
    /// 接收时间（Unix 秒）
    pub receive_time: u64,
    pub raw: Vec<u8>,
}

/// 报文负载到 history 明细的转换。
///
/// 负载格式由设备固件定义，不在引擎范围内；返回缺省 [`HistData`] 表示该帧无自动化事件。
pub trait HistDataInterpreter: Send + Sync {
    fn interpret(&self, frame: &TelemetryFrame) -> HistData;
}

impl<F> HistDataInterpreter for F
where
    F: Fn(&TelemetryFrame) -> HistData + Send + Sync,
{
    fn interpret(&self, frame: &TelemetryFrame) -> HistData {
        self(frame)
    }
}

/// 空解释器：只记录帧本身。
#[derive(Debug, Default)]
pub struct NoopInterpreter;

impl HistDataInterpreter for NoopInterpreter {
    fn interpret(&self, _frame: &TelemetryFrame) -> HistData {
        HistData::default()
    }
}

/// 一帧的接入结果。
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub frame: TelemetryFrame,
    pub history: HistoryRecord,
    /// 回执报文关联到的命令
    pub correlated: Option<RemoteControlCommand>,
    pub actions: Vec<AutomationAction>,
}

/// 接入服务。
#[derive(Clone)]
pub struct IngestService {
    decoder: PacketDecoder,
    dedup: DeduplicationGate,
    history_store: Arc<dyn HistoryStore>,
    device_store: Arc<dyn DeviceStore>,
    tracker: CommandLifecycleTracker,
    dispatcher: Arc<dyn AutomationDispatcher>,
    interpreter: Arc<dyn HistDataInterpreter>,
}

impl IngestService {
    pub fn new(
        config: &EngineConfig,
        history_store: Arc<dyn HistoryStore>,
        device_store: Arc<dyn DeviceStore>,
        command_store: Arc<dyn CommandStore>,
        dispatcher: Arc<dyn AutomationDispatcher>,
        interpreter: Arc<dyn HistDataInterpreter>,
    ) -> Self {
        Self {
            decoder: PacketDecoder::new(config.event_time_window),
            dedup: DeduplicationGate::new(history_store.clone()),
            history_store,
            device_store,
            tracker: CommandLifecycleTracker::new(command_store),
            dispatcher,
            interpreter,
        }
    }

    pub async fn ingest(&self, inbound: InboundFrame) -> Result<IngestOutcome, IngestError> {
        let span = info_span!(
            target: "fieldio.ingest",
            "ingest",
            invocation_id = %new_invocation_id(),
            sim_id = %inbound.sim_id
        );
        async move {
            record_frame_received();
            let result = self.ingest_inner(&inbound).await;
            if let Err(err) = &result {
                match err {
                    IngestError::Rejected(DecodeError::Duplicate) => record_dropped_duplicate(),
                    IngestError::Rejected(_) => record_frame_rejected(),
                    _ => {}
                }
                warn!(
                    target: "fieldio.ingest",
                    reject_code = ?err.reject_code(),
                    raw_len = inbound.raw.len(),
                    error = %err,
                    "frame_rejected"
                );
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn ingest_inner(&self, inbound: &InboundFrame) -> Result<IngestOutcome, IngestError> {
        let frame = self.decoder.decode(&inbound.raw, inbound.receive_time)?;
        if self
            .dedup
            .is_duplicate(&inbound.sim_id, frame.event_time)
            .await
            .map_err(|err| IngestError::Storage(err.to_string()))?
        {
            return Err(DecodeError::Duplicate.into());
        }

        let device = self
            .device_store
            .find_device_by_sim(&inbound.sim_id)
            .await
            .map_err(|err| IngestError::Storage(err.to_string()))?
            .ok_or_else(|| IngestError::UnknownDevice(inbound.sim_id.clone()))?;

        // 回执须在 history 写入之前关联：history 一旦写入，重试即被判为重复
        let correlated = match frame.request_no.as_deref() {
            Some(device_req_no) => {
                self.correlate(&inbound.sim_id, device_req_no, inbound.receive_time)
                    .await?
            }
            None => None,
        };

        let history = HistoryRecord {
            sim_id: inbound.sim_id.clone(),
            event_time: frame.event_time,
            device_id: device.device_id.clone(),
            hist_data: self.interpreter.interpret(&frame),
        };
        let inserted = self
            .history_store
            .put_if_absent(&history)
            .await
            .map_err(|err| IngestError::Storage(err.to_string()))?;
        if !inserted {
            // 并发调用抢先写入了同一帧
            return Err(DecodeError::Duplicate.into());
        }
        record_history_written();
        info!(
            target: "fieldio.ingest",
            device_id = %history.device_id,
            event_time = history.event_time,
            message_type = frame.message_type,
            event_type = ?history.hist_data.event_type,
            "history_written"
        );

        let actions: Vec<AutomationAction> =
            classify(std::slice::from_ref(&history), &device).collect();
        dispatch_actions(self.dispatcher.as_ref(), &actions).await;

        Ok(IngestOutcome {
            frame,
            history,
            correlated,
            actions,
        })
    }

    async fn correlate(
        &self,
        sim_id: &str,
        device_req_no: &str,
        receive_time: u64,
    ) -> Result<Option<RemoteControlCommand>, IngestError> {
        let at = i64::try_from(receive_time).unwrap_or(i64::MAX);
        match self
            .tracker
            .correlate_response(sim_id, device_req_no, at)
            .await
        {
            Ok(command) => Ok(Some(command)),
            Err(ControlError::UnknownRequest { .. }) => {
                record_response_unknown();
                warn!(
                    target: "fieldio.ingest",
                    device_req_no = %device_req_no,
                    "response_for_unknown_request_dropped"
                );
                Ok(None)
            }
            Err(err) => Err(IngestError::Storage(err.to_string())),
        }
    }
}
