use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{ReadHalf, WriteHalf};
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_driver::{Args, DeviceLink, DriverConfig, MatchOutcome, MatchState};
use protocol::BoardMessage;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("board_driver=debug".parse()?))
        .init();

    let args = Args::parse();
    let config = DriverConfig::from_args(&args)?;

    info!(device = %config.device, baud = config.baud, "打开串口...");
    // 打开串口是唯一的致命失败路径
    let port = tokio_serial::new(&config.device, config.baud)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .open_native_async()
        .with_context(|| format!("无法打开设备 {}", config.device))?;

    let (read_half, write_half): (ReadHalf<SerialStream>, WriteHalf<SerialStream>) =
        tokio::io::split(port);

    info!("启动设备链路...");
    let mut link = DeviceLink::open(read_half, write_half, config.max_read_retries);

    info!("复位棋盘并请求快照...");
    link.send_reset().await?;
    link.request_board_dump().await?;
    link.request_field_updates().await?;

    let mut state = MatchState::new();

    loop {
        let message = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("收到中断信号，退出");
                break;
            }
            message = link.recv() => match message {
                Some(m) => m,
                None => {
                    warn!("消息流已结束");
                    break;
                }
            },
        };

        if let Err(e) = dispatch(&mut state, &mut link, &message).await {
            error!(error = %e, "下发命令失败");
            break;
        }
    }

    link.shutdown().await?;
    Ok(())
}

/// 处理一条棋盘消息：交给推断引擎，按结论记日志或下发命令
async fn dispatch<W>(
    state: &mut MatchState,
    link: &mut DeviceLink<W>,
    message: &BoardMessage,
) -> protocol::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    match state.handle(message) {
        MatchOutcome::GameStarted => {
            info!("对局开始!");
        }
        MatchOutcome::AwaitingSetup => {
            info!("棋子尚未摆好");
        }
        MatchOutcome::MoveAccepted { san, .. } => {
            info!(san = %san, "接受走法");
            if let Some(fen) = state.current_board_fen() {
                info!(board = %fen, "当前局面");
            }
        }
        MatchOutcome::NotAMove { board_fen, diffs } => {
            info!(board = %board_fen, "不是一步走法");
            info!("与最近合法局面的差异:");
            for diff in diffs {
                info!(
                    square = %diff.square,
                    want = %diff.expected.map(|p| p.char()).unwrap_or('-'),
                    have = %diff.observed.map(|p| p.char()).unwrap_or('-'),
                    "差异",
                );
            }
        }
        MatchOutcome::PositionNotEvaluable { board_fen } => {
            warn!(board = %board_fen, "快照无法解析，跳过差异诊断");
        }
        MatchOutcome::RequestBoardDump => {
            link.request_board_dump().await?;
        }
        MatchOutcome::Unhandled { code } => {
            info!(code = format_args!("{code:02x}"), "未处理的消息");
        }
    }
    Ok(())
}
