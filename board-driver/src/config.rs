//! 驱动配置

use std::path::Path;

use serde::{Deserialize, Serialize};

use protocol::{DEFAULT_BAUD_RATE, DEFAULT_MAX_READ_RETRIES};

use crate::args::Args;

/// 驱动配置。可从 JSON 文件加载，命令行参数覆盖文件内容
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// 棋盘设备路径
    pub device: String,
    /// 波特率（8 数据位，1 停止位，无校验）
    pub baud: u32,
    /// 连续读错误上限，超过则退出
    pub max_read_retries: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyACM0".to_string(),
            baud: DEFAULT_BAUD_RATE,
            max_read_retries: DEFAULT_MAX_READ_RETRIES,
        }
    }
}

impl DriverConfig {
    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 由命令行参数构建：有配置文件先读文件，再用参数覆盖
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(device) = &args.device {
            config.device = device.clone();
        }
        if let Some(baud) = args.baud {
            config.baud = baud;
        }
        Ok(config)
    }
}
