use fieldio_telemetry::{metrics, new_invocation_id, record_commands_timed_out};

#[test]
fn invocation_ids_are_unique() {
    let first = new_invocation_id();
    let second = new_invocation_id();
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn timed_out_counter_accumulates() {
    let before = metrics().snapshot().commands_timed_out;
    record_commands_timed_out(3);
    assert!(metrics().snapshot().commands_timed_out >= before + 3);
}
