//! 验证辅助函数
//!
//! 所有存储键在访问前校验非空：
//! - ensure_sim_id：SIM ID 是去重与请求号分配的作用域
//! - ensure_device_req_no：请求号是命令与回执的唯一关联键

use crate::error::StorageError;

/// 验证 SIM ID 非空
pub fn ensure_sim_id(sim_id: &str) -> Result<(), StorageError> {
    if sim_id.is_empty() {
        return Err(StorageError::MissingKey("sim_id"));
    }
    Ok(())
}

/// 验证命令键 `(sim_id, device_req_no)`
pub fn ensure_device_req_no(sim_id: &str, device_req_no: &str) -> Result<(), StorageError> {
    ensure_sim_id(sim_id)?;
    if device_req_no.is_empty() {
        return Err(StorageError::MissingKey("device_req_no"));
    }
    Ok(())
}
