//! 传感棋盘串口驱动
//!
//! 包含:
//! - 设备链路并发管线 (DeviceLink)
//! - 走法推断引擎 (MatchState)
//! - 命令行参数与配置

pub mod args;
pub mod config;
pub mod link;
pub mod matcher;

pub use args::Args;
pub use config::DriverConfig;
pub use link::DeviceLink;
pub use matcher::{MatchOutcome, MatchState, SquareDiff};
