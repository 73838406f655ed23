//! 报文解码器
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let decoder = PacketDecoder::new(config.event_time_window);
//! let frame = decoder.decode(&raw, receive_time)?;
//! ```

use crate::error::{DecodeError, EncodeError};
use bytes::{Buf, BufMut, BytesMut};
use domain::{DEVICE_TYPES, MESSAGE_TYPES, MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE, TelemetryFrame};
use fieldio_config::TimeWindow;

/// 固定头部长度：length + device_type + version + message_type。
const HEADER_LEN: usize = 8;
const REQUEST_NO_LEN: usize = 4;
const EVENT_TIME_LEN: usize = 8;

/// 上报报文解码器（纯计算，无 I/O）。
#[derive(Debug, Clone, Copy)]
pub struct PacketDecoder {
    window: TimeWindow,
}

impl PacketDecoder {
    pub fn new(window: TimeWindow) -> Self {
        Self { window }
    }

    /// 解码并执行校验 1–4。`receive_time` 为接收时刻（Unix 秒）。
    pub fn decode(&self, raw: &[u8], receive_time: u64) -> Result<TelemetryFrame, DecodeError> {
        if raw.len() < HEADER_LEN {
            return Err(DecodeError::FrameLength);
        }
        let mut cursor = raw;
        let total_length = cursor.get_u16();
        if total_length as usize != raw.len() {
            return Err(DecodeError::FrameLength);
        }
        let device_type = cursor.get_u16();
        let protocol_version = cursor.get_u16();
        let message_type = cursor.get_u16();
        if !DEVICE_TYPES.contains(&device_type) {
            return Err(DecodeError::DeviceType);
        }
        if !MESSAGE_TYPES.contains(&message_type) {
            return Err(DecodeError::MessageType);
        }

        let request_no = if message_type == MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE {
            if cursor.remaining() < REQUEST_NO_LEN {
                return Err(DecodeError::FrameLength);
            }
            let mut bytes = [0u8; REQUEST_NO_LEN];
            cursor.copy_to_slice(&mut bytes);
            Some(request_no_from_bytes(bytes))
        } else {
            None
        };

        if cursor.remaining() < EVENT_TIME_LEN {
            return Err(DecodeError::FrameLength);
        }
        let event_time = cursor.get_u64();
        if !self.in_window(event_time, receive_time) {
            return Err(DecodeError::EventTimeOutOfWindow);
        }

        Ok(TelemetryFrame {
            total_length,
            device_type,
            protocol_version,
            message_type,
            request_no,
            event_time,
            payload: cursor.to_vec(),
        })
    }

    fn in_window(&self, event_time: u64, receive_time: u64) -> bool {
        let earliest = receive_time.saturating_sub(self.window.past_seconds);
        let latest = receive_time.saturating_add(self.window.future_seconds);
        (earliest..=latest).contains(&event_time)
    }
}

/// 4 字节请求号的文本形式（8 位小写十六进制）。
pub fn request_no_from_bytes(bytes: [u8; 4]) -> String {
    hex::encode(bytes)
}

/// 按线格式编码报文，`total_length` 字段按实际长度重新计算。
///
/// `request_no` 仅在 `0x8002` 报文中写出；非法的十六进制请求号按 0 写出。
/// 总长超过 65535 字节时返回 [`EncodeError::FrameTooLarge`]。
pub fn encode(frame: &TelemetryFrame) -> Result<Vec<u8>, EncodeError> {
    let has_request_no = frame.message_type == MESSAGE_TYPE_REMOTE_CONTROL_RESPONSE;
    let len = HEADER_LEN
        + if has_request_no { REQUEST_NO_LEN } else { 0 }
        + EVENT_TIME_LEN
        + frame.payload.len();
    let total_length = u16::try_from(len).map_err(|_| EncodeError::FrameTooLarge(len))?;
    let mut buf = BytesMut::with_capacity(len);
    buf.put_u16(total_length);
    buf.put_u16(frame.device_type);
    buf.put_u16(frame.protocol_version);
    buf.put_u16(frame.message_type);
    if has_request_no {
        let mut bytes = [0u8; REQUEST_NO_LEN];
        if let Some(text) = frame.request_no.as_deref() {
            let _ = hex::decode_to_slice(text, &mut bytes);
        }
        buf.put_slice(&bytes);
    }
    buf.put_u64(frame.event_time);
    buf.put_slice(&frame.payload);
    Ok(buf.to_vec())
}
