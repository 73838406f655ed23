use async_trait::async_trait;
use domain::{
    AutomationAction, CommandState, DeviceInfo, HistData, MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE,
    RemoteControlCommand, TelemetryFrame,
};
use fieldio_automation::{AutomationDispatcher, AutomationError};
use fieldio_config::EngineConfig;
use fieldio_control::CommandService;
use fieldio_ingest::{InboundFrame, IngestError, IngestService};
use fieldio_protocol::{DecodeError, encode};
use fieldio_storage::{
    CommandStore, CommandWriteResult, HistoryStore, InMemoryCommandStore, InMemoryDeviceStore,
    InMemoryHistoryStore, InMemoryRequestCounterStore, StorageError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const NOW: u64 = 1_700_000_000;

#[derive(Default)]
struct RecordingDispatcher {
    actions: Mutex<Vec<AutomationAction>>,
}

#[async_trait]
impl AutomationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, action: &AutomationAction) -> Result<(), AutomationError> {
        self.actions.lock().expect("lock").push(action.clone());
        Ok(())
    }
}

/// 第一次查询命令时返回存储错误，之后正常。
#[derive(Default)]
struct FlakyCommandStore {
    inner: InMemoryCommandStore,
    failed: AtomicBool,
}

#[async_trait]
impl CommandStore for FlakyCommandStore {
    async fn create_command_if_absent(
        &self,
        record: RemoteControlCommand,
    ) -> Result<CommandWriteResult, StorageError> {
        self.inner.create_command_if_absent(record).await
    }

    async fn find_latest_command(
        &self,
        sim_id: &str,
        device_req_no: &str,
    ) -> Result<Option<RemoteControlCommand>, StorageError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Corrupt("connection reset".to_string()));
        }
        self.inner.find_latest_command(sim_id, device_req_no).await
    }

    async fn transition_command_state(
        &self,
        sim_id: &str,
        device_req_no: &str,
        from: CommandState,
        to: CommandState,
        at: i64,
    ) -> Result<bool, StorageError> {
        self.inner
            .transition_command_state(sim_id, device_req_no, from, to, at)
            .await
    }

    async fn list_pending_commands(
        &self,
        issued_before: i64,
    ) -> Result<Vec<RemoteControlCommand>, StorageError> {
        self.inner.list_pending_commands(issued_before).await
    }
}

struct Harness {
    service: IngestService,
    commands: CommandService,
    history: Arc<InMemoryHistoryStore>,
    dispatcher: Arc<RecordingDispatcher>,
}

// 负载首字节 1 表示 power_on
fn interpret(frame: &TelemetryFrame) -> HistData {
    match frame.payload.first() {
        Some(1) => HistData {
            event_type: Some("power_on".to_string()),
            ..HistData::default()
        },
        _ => HistData::default(),
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(InMemoryCommandStore::new()))
}

fn harness_with(command_store: Arc<dyn CommandStore>) -> Harness {
    let history = Arc::new(InMemoryHistoryStore::new());
    let devices = Arc::new(InMemoryDeviceStore::with_devices([DeviceInfo {
        device_id: "dev-1".to_string(),
        sim_id: "sim-1".to_string(),
        terminal_settings: None,
    }]));
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let service = IngestService::new(
        &EngineConfig::default(),
        history.clone(),
        devices,
        command_store.clone(),
        dispatcher.clone(),
        Arc::new(interpret),
    );
    let commands = CommandService::new(Arc::new(InMemoryRequestCounterStore::new()), command_store);
    Harness {
        service,
        commands,
        history,
        dispatcher,
    }
}

fn frame(message_type: u16, request_no: Option<&str>, event_time: u64, payload: &[u8]) -> Vec<u8> {
    encode(&TelemetryFrame {
        total_length: 0,
        device_type: 1,
        protocol_version: 1,
        message_type,
        request_no: request_no.map(str::to_string),
        event_time,
        payload: payload.to_vec(),
    })
    .expect("encode")
}

fn inbound(sim_id: &str, raw: Vec<u8>) -> InboundFrame {
    InboundFrame {
        sim_id: sim_id.to_string(),
        receive_time: NOW,
        raw,
    }
}

#[tokio::test]
async fn accepted_frame_is_written_and_power_on_dispatched() {
    let h = harness();
    let outcome = h
        .service
        .ingest(inbound("sim-1", frame(0x0001, None, NOW - 5, &[1])))
        .await
        .expect("ingest");

    assert_eq!(outcome.history.device_id, "dev-1");
    assert_eq!(outcome.history.event_time, NOW - 5);
    assert!(outcome.correlated.is_none());
    assert_eq!(outcome.actions.len(), 1);
    assert_eq!(outcome.actions[0].event_type, "power_on");
    assert_eq!(outcome.actions[0].occurrence_flag, Some(1));
    assert_eq!(h.history.len(), 1);
    assert_eq!(h.dispatcher.actions.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn retransmitted_frame_is_rejected_as_duplicate() {
    let h = harness();
    let raw = frame(0x0001, None, NOW - 5, &[1]);
    h.service
        .ingest(inbound("sim-1", raw.clone()))
        .await
        .expect("first");

    let err = h
        .service
        .ingest(inbound("sim-1", raw))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, IngestError::Rejected(DecodeError::Duplicate)));
    assert_eq!(err.reject_code(), Some(5));
    assert_eq!(h.history.len(), 1);
    assert_eq!(h.dispatcher.actions.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn length_mismatch_writes_nothing() {
    let h = harness();
    let mut raw = vec![0x00, 0x0a];
    raw.extend_from_slice(&[0u8; 7]);

    let err = h
        .service
        .ingest(inbound("sim-1", raw))
        .await
        .expect_err("rejected");
    assert_eq!(err.reject_code(), Some(1));
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn stale_frame_is_rejected_before_storage() {
    let h = harness();
    let err = h
        .service
        .ingest(inbound("sim-1", frame(0x0001, None, NOW - 86_401, &[1])))
        .await
        .expect_err("rejected");
    assert_eq!(err.reject_code(), Some(4));
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn unregistered_sim_is_reported() {
    let h = harness();
    let err = h
        .service
        .ingest(inbound("sim-9", frame(0x0001, None, NOW, &[])))
        .await
        .expect_err("unknown");
    assert!(matches!(err, IngestError::UnknownDevice(ref sim) if sim == "sim-9"));
    assert_eq!(err.reject_code(), None);
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn response_frame_marks_command_responded() {
    let h = harness();
    let issued = h
        .commands
        .issue("sim-1", 3, (NOW - 10) as i64)
        .await
        .expect("issue");

    let outcome = h
        .service
        .ingest(inbound(
            "sim-1",
            frame(
                MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE,
                Some(&issued.device_req_no),
                NOW - 1,
                &[],
            ),
        ))
        .await
        .expect("ingest");

    let correlated = outcome.correlated.expect("correlated");
    assert_eq!(correlated.device_req_no, issued.device_req_no);
    assert_eq!(correlated.state, CommandState::Responded);
    assert_eq!(correlated.resolved_at, Some(NOW as i64));
    assert!(outcome.actions.is_empty());
    assert_eq!(
        h.history.count("sim-1", NOW - 1).await.expect("count"),
        1
    );
}

#[tokio::test]
async fn response_for_unknown_request_is_still_recorded() {
    let h = harness();
    let outcome = h
        .service
        .ingest(inbound(
            "sim-1",
            frame(MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE, Some("0000beef"), NOW, &[]),
        ))
        .await
        .expect("ingest");

    assert_eq!(outcome.frame.request_no.as_deref(), Some("0000beef"));
    assert!(outcome.correlated.is_none());
    assert_eq!(h.history.len(), 1);
}

#[tokio::test]
async fn response_retried_after_storage_failure_is_correlated() {
    let h = harness_with(Arc::new(FlakyCommandStore::default()));
    let issued = h
        .commands
        .issue("sim-1", 3, (NOW - 10) as i64)
        .await
        .expect("issue");
    let raw = frame(
        MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE,
        Some(&issued.device_req_no),
        NOW - 1,
        &[],
    );

    let err = h
        .service
        .ingest(inbound("sim-1", raw.clone()))
        .await
        .expect_err("store failure");
    assert!(matches!(err, IngestError::Storage(_)));
    assert!(h.history.is_empty());

    let outcome = h
        .service
        .ingest(inbound("sim-1", raw))
        .await
        .expect("retry");
    let correlated = outcome.correlated.expect("correlated");
    assert_eq!(correlated.state, CommandState::Responded);
    assert_eq!(h.history.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_frames_accept_exactly_one() {
    let h = harness();
    let service = Arc::new(h.service);
    let raw = frame(0x0001, None, NOW - 5, &[1]);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        let raw = raw.clone();
        handles.push(tokio::spawn(async move {
            service.ingest(inbound("sim-1", raw)).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(err.reject_code(), Some(5)),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(h.history.len(), 1);
    assert_eq!(h.dispatcher.actions.lock().expect("lock").len(), 1);
}
