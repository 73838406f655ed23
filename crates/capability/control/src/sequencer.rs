//! 请求号分配

use crate::ControlError;
use fieldio_protocol::request_no_from_bytes;
use fieldio_storage::RequestCounterStore;
use std::sync::Arc;

/// 分配得到的请求号。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNo {
    /// 计数器新值（十进制空间）。
    pub count: i64,
    /// 线格式请求号：计数按大端 4 字节转为小写十六进制。
    pub device_req_no: String,
}

impl RequestNo {
    /// 线格式只有 4 字节：计数超出 `1..=u32::MAX` 时返回 None，不回绕。
    pub fn from_count(count: i64) -> Option<Self> {
        let wire = u32::try_from(count).ok().filter(|value| *value > 0)?;
        Some(Self {
            count,
            device_req_no: request_no_from_bytes(wire.to_be_bytes()),
        })
    }
}

/// 按 SIM 分配单调递增的请求号。
#[derive(Clone)]
pub struct CommandSequencer {
    counter_store: Arc<dyn RequestCounterStore>,
}

impl CommandSequencer {
    pub fn new(counter_store: Arc<dyn RequestCounterStore>) -> Self {
        Self { counter_store }
    }

    /// 计数器在存储端原子 +1，引擎不做读改写。
    pub async fn allocate_request_no(&self, sim_id: &str) -> Result<RequestNo, ControlError> {
        let count = self
            .counter_store
            .increment(sim_id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?;
        RequestNo::from_count(count).ok_or_else(|| ControlError::RequestNoExhausted {
            sim_id: sim_id.to_string(),
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_no_renders_four_wire_bytes() {
        let rendered = |count| RequestNo::from_count(count).map(|no| no.device_req_no);
        assert_eq!(rendered(1).as_deref(), Some("00000001"));
        assert_eq!(rendered(0x1234_abcd).as_deref(), Some("1234abcd"));
        assert_eq!(rendered(i64::from(u32::MAX)).as_deref(), Some("ffffffff"));
    }

    #[test]
    fn count_outside_wire_range_is_rejected() {
        assert!(RequestNo::from_count(0).is_none());
        assert!(RequestNo::from_count(-1).is_none());
        assert!(RequestNo::from_count(0x1_0000_0000).is_none());
    }
}
