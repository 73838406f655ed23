use domain::{CommandState, DeviceInfo};

#[test]
fn device_info_tolerates_missing_fields() {
    let device: DeviceInfo = serde_json::from_str(r#"{"device_id":"dev-1"}"#).expect("parse");
    assert_eq!(device.device_id, "dev-1");
    assert_eq!(device.sim_id, "");
    assert!(device.di_list().is_empty());

    let device: DeviceInfo = serde_json::from_str(
        r#"{"device_id":"dev-1","terminal_settings":{"di_list":[{"terminal_no":2,"di_on_name":"open"}]}}"#,
    )
    .expect("parse");
    let di = &device.di_list()[0];
    assert_eq!(di.terminal_no, 2);
    assert_eq!(di.di_on_name, "open");
    assert_eq!(di.di_off_name, "");
}

#[test]
fn command_state_text_form() {
    for state in [CommandState::Pending, CommandState::Responded, CommandState::TimedOut] {
        assert_eq!(CommandState::parse(state.as_str()), Some(state));
    }
    assert!(CommandState::parse("accepted").is_none());
    assert!(!CommandState::Pending.is_terminal());
    assert!(CommandState::TimedOut.is_terminal());
}
