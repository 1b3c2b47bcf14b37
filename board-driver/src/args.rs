//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "board-driver")]
#[command(about = "传感棋盘串口驱动：解码棋盘协议并推断实际走法")]
pub struct Args {
    /// 棋盘设备 (例如 /dev/ttyUSB0, /dev/ttyACM0)，默认 /dev/ttyACM0
    #[arg(short, long)]
    pub device: Option<String>,

    /// 波特率
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// JSON 配置文件，命令行参数优先于文件内容
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
