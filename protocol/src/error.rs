//! 错误类型定义
//!
//! 稳态运行中的协议问题（报文头损坏、快照与合法走法不匹配）不算错误：
//! 前者由逐字节重新同步恢复，后者作为诊断事件上报。这里只定义
//! 传输层面的失败。

use thiserror::Error;

/// 设备链路错误
#[derive(Error, Debug)]
pub enum LinkError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 连续读错误超过上限
    #[error("Read failed {attempts} times in a row, giving up")]
    ReadRetriesExhausted { attempts: u32 },

    /// 链路已关闭
    #[error("Device link closed")]
    Closed,
}

/// 链路操作结果类型
pub type Result<T> = std::result::Result<T, LinkError>;
