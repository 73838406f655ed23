use async_trait::async_trait;
use domain::{AutomationAction, DeviceInfo, DiSetting, EventDetail, HistData, HistoryRecord, TerminalSettings};
use fieldio_automation::{
    AutomationDispatcher, AutomationError, classify_device_history, dispatch_actions,
};
use fieldio_storage::{HistoryStore, InMemoryDeviceStore, InMemoryHistoryStore};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingDispatcher {
    actions: Mutex<Vec<AutomationAction>>,
    fail_event_type: Option<&'static str>,
}

#[async_trait]
impl AutomationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, action: &AutomationAction) -> Result<(), AutomationError> {
        if self.fail_event_type == Some(action.event_type.as_str()) {
            return Err(AutomationError::Dispatch("rejected".to_string()));
        }
        self.actions.lock().expect("lock").push(action.clone());
        Ok(())
    }
}

fn history(event_time: u64, hist_data: HistData) -> HistoryRecord {
    HistoryRecord {
        sim_id: "sim-1".to_string(),
        event_time,
        device_id: "dev-1".to_string(),
        hist_data,
    }
}

async fn seeded_history() -> InMemoryHistoryStore {
    let store = InMemoryHistoryStore::new();
    let records = [
        history(
            200,
            HistData {
                event_type: Some("di_change".to_string()),
                terminal_no: Some(2),
                terminal_state_name: Some("open".to_string()),
                occurrence_flag: None,
            },
        ),
        history(
            100,
            HistData {
                event_type: Some("power_on".to_string()),
                occurrence_flag: Some(0),
                ..HistData::default()
            },
        ),
    ];
    for record in &records {
        store.put_if_absent(record).await.expect("seed");
    }
    store
}

#[tokio::test]
async fn device_history_is_classified_in_time_order() {
    let history_store = seeded_history().await;
    let device_store = InMemoryDeviceStore::with_devices([DeviceInfo {
        device_id: "dev-1".to_string(),
        sim_id: "sim-1".to_string(),
        terminal_settings: Some(TerminalSettings {
            di_list: vec![DiSetting {
                terminal_no: 2,
                di_on_name: "open".to_string(),
                di_off_name: "closed".to_string(),
            }],
            do_list: Vec::new(),
        }),
    }]);

    let actions = classify_device_history(&history_store, &device_store, "dev-1")
        .await
        .expect("classify");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].event_type, "power_on");
    assert_eq!(actions[0].occurrence_flag, Some(1));
    assert_eq!(actions[1].event_type, "di_change_state");
    assert_eq!(actions[1].terminal_no, Some(2));
    assert_eq!(actions[1].event_detail, Some(EventDetail::Open));
}

#[tokio::test]
async fn missing_device_config_drops_di_change_only() {
    let history_store = seeded_history().await;
    let device_store = InMemoryDeviceStore::new();
    let actions = classify_device_history(&history_store, &device_store, "dev-1")
        .await
        .expect("classify");
    let types: Vec<&str> = actions.iter().map(|action| action.event_type.as_str()).collect();
    assert_eq!(types, vec!["power_on"]);
}

#[tokio::test]
async fn dispatch_failures_do_not_stop_remaining_actions() {
    let dispatcher = RecordingDispatcher {
        fail_event_type: Some("battery_near"),
        ..RecordingDispatcher::default()
    };
    let actions = vec![
        AutomationAction {
            device_id: "dev-1".to_string(),
            event_type: "battery_near".to_string(),
            terminal_no: None,
            event_detail: None,
            occurrence_flag: Some(1),
        },
        AutomationAction {
            device_id: "dev-1".to_string(),
            event_type: "power_on".to_string(),
            terminal_no: None,
            event_detail: None,
            occurrence_flag: Some(1),
        },
    ];
    let dispatched = dispatch_actions(&dispatcher, &actions).await;
    assert_eq!(dispatched, 1);
    let recorded = dispatcher.actions.lock().expect("lock");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].event_type, "power_on");
}
