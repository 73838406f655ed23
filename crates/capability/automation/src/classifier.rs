//! 表驱动的自动化触发分类。
//!
//! | event_type | 输出 event_type | terminal_no | event_detail | occurrence_flag |
//! |---|---|---|---|---|
//! | device_unhealthy | device_unhealthy | - | - | 记录值 |
//! | di_unhealthy | di_unhealthy | 记录值 | - | 记录值 |
//! | di_change | di_change_state | 记录值 | open / close | - |
//! | battery_near 等异常类 | 同名 | - | - | 记录值 |
//! | power_on | power_on | - | - | 固定 1 |

use domain::{AutomationAction, DeviceInfo, EventDetail, HistoryRecord};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum FlagSource {
    Record,
    Fixed(i64),
    Absent,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    event_type: &'static str,
    output_event_type: &'static str,
    with_terminal_no: bool,
    with_di_detail: bool,
    flag: FlagSource,
}

const fn flagged(event_type: &'static str) -> Rule {
    Rule {
        event_type,
        output_event_type: event_type,
        with_terminal_no: false,
        with_di_detail: false,
        flag: FlagSource::Record,
    }
}

const RULES: [Rule; 8] = [
    flagged("device_unhealthy"),
    Rule {
        with_terminal_no: true,
        ..flagged("di_unhealthy")
    },
    Rule {
        event_type: "di_change",
        output_event_type: "di_change_state",
        with_terminal_no: true,
        with_di_detail: true,
        flag: FlagSource::Absent,
    },
    flagged("battery_near"),
    flagged("device_abnormality"),
    flagged("parameter_abnormality"),
    flagged("fw_update_abnormality"),
    Rule {
        flag: FlagSource::Fixed(1),
        ..flagged("power_on")
    },
];

fn rule_for(event_type: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.event_type == event_type)
}

/// 按输入顺序惰性产生动作；未识别的事件类型被跳过。
pub fn classify<'a, I>(records: I, device: &'a DeviceInfo) -> impl Iterator<Item = AutomationAction>
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    records
        .into_iter()
        .filter_map(move |record| classify_record(record, device))
}

/// 单条记录的分类结果。
pub fn classify_record(record: &HistoryRecord, device: &DeviceInfo) -> Option<AutomationAction> {
    let hist = &record.hist_data;
    let rule = rule_for(hist.event_type.as_deref()?)?;

    let event_detail = if rule.with_di_detail {
        let state_name = hist.terminal_state_name.as_deref().unwrap_or_default();
        match di_detail(device, state_name) {
            Some(detail) => Some(detail),
            None => {
                debug!(
                    target: "fieldio.automation",
                    device_id = %record.device_id,
                    terminal_no = ?hist.terminal_no,
                    terminal_state_name = %state_name,
                    "di_change_without_matching_terminal_name"
                );
                return None;
            }
        }
    } else {
        None
    };

    let occurrence_flag = match rule.flag {
        FlagSource::Record => hist.occurrence_flag,
        FlagSource::Fixed(value) => Some(value),
        FlagSource::Absent => None,
    };

    Some(AutomationAction {
        device_id: record.device_id.clone(),
        event_type: rule.output_event_type.to_string(),
        terminal_no: if rule.with_terminal_no {
            hist.terminal_no
        } else {
            None
        },
        event_detail,
        occurrence_flag,
    })
}

/// 先匹配 di_on_name，再匹配 di_off_name；空名称不参与匹配。
fn di_detail(device: &DeviceInfo, state_name: &str) -> Option<EventDetail> {
    if state_name.is_empty() {
        return None;
    }
    let di_list = device.di_list();
    if di_list.iter().any(|di| di.di_on_name == state_name) {
        return Some(EventDetail::Open);
    }
    if di_list.iter().any(|di| di.di_off_name == state_name) {
        return Some(EventDetail::Close);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DiSetting, HistData, TerminalSettings};

    fn record(hist_data: HistData) -> HistoryRecord {
        HistoryRecord {
            sim_id: "sim-1".to_string(),
            event_time: 1_700_000_000,
            device_id: "dev-1".to_string(),
            hist_data,
        }
    }

    fn event(event_type: &str) -> HistData {
        HistData {
            event_type: Some(event_type.to_string()),
            ..HistData::default()
        }
    }

    fn device_with_di(di_list: Vec<DiSetting>) -> DeviceInfo {
        DeviceInfo {
            device_id: "dev-1".to_string(),
            sim_id: "sim-1".to_string(),
            terminal_settings: Some(TerminalSettings {
                di_list,
                do_list: Vec::new(),
            }),
        }
    }

    #[test]
    fn di_change_open_on_matching_on_name() {
        let device = device_with_di(vec![DiSetting {
            terminal_no: 2,
            di_on_name: "open".to_string(),
            di_off_name: "closed".to_string(),
        }]);
        let input = record(HistData {
            terminal_no: Some(2),
            terminal_state_name: Some("open".to_string()),
            occurrence_flag: Some(1),
            ..event("di_change")
        });
        let action = classify_record(&input, &device).expect("action");
        assert_eq!(action.device_id, "dev-1");
        assert_eq!(action.event_type, "di_change_state");
        assert_eq!(action.terminal_no, Some(2));
        assert_eq!(action.event_detail, Some(EventDetail::Open));
        assert_eq!(action.occurrence_flag, None);
    }

    #[test]
    fn di_change_close_on_matching_off_name() {
        let device = device_with_di(vec![DiSetting {
            terminal_no: 1,
            di_on_name: "alarm".to_string(),
            di_off_name: "normal".to_string(),
        }]);
        let input = record(HistData {
            terminal_no: Some(1),
            terminal_state_name: Some("normal".to_string()),
            ..event("di_change")
        });
        let action = classify_record(&input, &device).expect("action");
        assert_eq!(action.event_detail, Some(EventDetail::Close));
    }

    #[test]
    fn di_change_without_match_yields_nothing() {
        let input = record(HistData {
            terminal_no: Some(1),
            terminal_state_name: Some("unknown".to_string()),
            ..event("di_change")
        });
        let device = device_with_di(vec![DiSetting {
            terminal_no: 1,
            di_on_name: "alarm".to_string(),
            di_off_name: "normal".to_string(),
        }]);
        assert!(classify_record(&input, &device).is_none());

        // 无端子配置
        assert!(classify_record(&input, &DeviceInfo::default()).is_none());

        // 空名称不与缺省的空配置匹配
        let blank = record(HistData {
            terminal_no: Some(1),
            ..event("di_change")
        });
        let unnamed = device_with_di(vec![DiSetting::default()]);
        assert!(classify_record(&blank, &unnamed).is_none());
    }

    #[test]
    fn power_on_always_sets_occurrence() {
        let input = record(HistData {
            occurrence_flag: Some(0),
            terminal_no: Some(4),
            ..event("power_on")
        });
        let action = classify_record(&input, &DeviceInfo::default()).expect("action");
        assert_eq!(action.event_type, "power_on");
        assert_eq!(action.terminal_no, None);
        assert_eq!(action.event_detail, None);
        assert_eq!(action.occurrence_flag, Some(1));
    }

    #[test]
    fn flag_passthrough_events() {
        for event_type in [
            "device_unhealthy",
            "battery_near",
            "device_abnormality",
            "parameter_abnormality",
            "fw_update_abnormality",
        ] {
            let input = record(HistData {
                occurrence_flag: Some(0),
                terminal_no: Some(3),
                ..event(event_type)
            });
            let action = classify_record(&input, &DeviceInfo::default()).expect("action");
            assert_eq!(action.event_type, event_type);
            assert_eq!(action.terminal_no, None);
            assert_eq!(action.occurrence_flag, Some(0));
        }

        let input = record(HistData {
            occurrence_flag: Some(1),
            terminal_no: Some(3),
            ..event("di_unhealthy")
        });
        let action = classify_record(&input, &DeviceInfo::default()).expect("action");
        assert_eq!(action.terminal_no, Some(3));
        assert_eq!(action.occurrence_flag, Some(1));
    }

    #[test]
    fn classify_skips_unknown_and_keeps_order() {
        let records = vec![
            record(event("battery_near")),
            record(event("firmware_downloaded")),
            record(HistData::default()),
            record(event("power_on")),
        ];
        let types: Vec<String> = classify(&records, &DeviceInfo::default())
            .map(|action| action.event_type)
            .collect();
        assert_eq!(types, vec!["battery_near", "power_on"]);
    }
}
