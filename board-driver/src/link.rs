//! 设备链路：串口连接的并发管线封装
//!
//! 两个独立调度的阶段，通过两条有界队列衔接：
//!
//! - 读取阶段：阻塞读串口，把读到的字节逐个推入字节队列；
//! - 成帧阶段：从字节队列逐字节取出，累积后交给报文提取器，
//!   解出的消息推入消息队列。
//!
//! 队列满时 send 挂起，对上游形成背压；队列空时 recv 挂起，
//! 不空转。框架外的代码只从消息队列读取。出站命令不走队列，
//! 由链路持有的写端同步写出。

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use protocol::{
    extract_message, BoardMessage, LinkError, Result, BYTE_QUEUE_CAPACITY, CMD_SEND_BOARD,
    CMD_SEND_RESET, CMD_SEND_UPDATE_BOARD, MESSAGE_QUEUE_CAPACITY,
};

/// 设备链路。拥有串口写端和消息队列的消费端
pub struct DeviceLink<W> {
    writer: W,
    messages: mpsc::Receiver<BoardMessage>,
    shutdown: watch::Sender<bool>,
    reader_task: JoinHandle<Result<()>>,
    framer_task: JoinHandle<()>,
}

impl<W: AsyncWrite + Unpin> DeviceLink<W> {
    /// 在给定的读写端上启动管线
    pub fn open<R>(reader: R, writer: W, max_read_retries: u32) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (byte_tx, byte_rx) = mpsc::channel(BYTE_QUEUE_CAPACITY);
        let (msg_tx, msg_rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reader_task = tokio::spawn(read_stage(
            reader,
            byte_tx,
            shutdown_rx.clone(),
            max_read_retries,
        ));
        let framer_task = tokio::spawn(frame_stage(byte_rx, msg_tx, shutdown_rx));

        Self {
            writer,
            messages: msg_rx,
            shutdown: shutdown_tx,
            reader_task,
            framer_task,
        }
    }

    /// 取下一条消息。链路终止后返回 None
    pub async fn recv(&mut self) -> Option<BoardMessage> {
        self.messages.recv().await
    }

    /// 复位棋盘
    pub async fn send_reset(&mut self) -> Result<()> {
        self.send_command(CMD_SEND_RESET).await
    }

    /// 请求一次整盘快照
    pub async fn request_board_dump(&mut self) -> Result<()> {
        self.send_command(CMD_SEND_BOARD).await
    }

    /// 请求进入增量更新模式
    pub async fn request_field_updates(&mut self) -> Result<()> {
        self.send_command(CMD_SEND_UPDATE_BOARD).await
    }

    async fn send_command(&mut self, command: u8) -> Result<()> {
        self.writer.write_all(&[command]).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// 通知两个阶段停止并等待它们退出，返回读取阶段的最终结果
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        drop(self.messages);

        let read_result = self.reader_task.await.map_err(|_| LinkError::Closed)?;
        self.framer_task.await.map_err(|_| LinkError::Closed)?;
        read_result
    }
}

/// 读取阶段：串口 -> 字节队列
///
/// 读错误记日志后重试；连续失败超过上限则上抛，避免和挂死的
/// 设备无法区分。读到 0 字节视为对端关闭，阶段正常结束。
async fn read_stage<R: AsyncRead + Unpin>(
    mut reader: R,
    bytes: mpsc::Sender<u8>,
    mut shutdown: watch::Receiver<bool>,
    max_read_retries: u32,
) -> Result<()> {
    let mut buf = [0u8; 2048];
    let mut consecutive_errors = 0u32;

    loop {
        let n = tokio::select! {
            _ = shutdown.changed() => return Ok(()),
            result = reader.read(&mut buf) => match result {
                Ok(0) => {
                    info!("串口已关闭，读取阶段结束");
                    return Ok(());
                }
                Ok(n) => {
                    consecutive_errors = 0;
                    n
                }
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(error = %e, attempt = consecutive_errors, "读串口失败");
                    if consecutive_errors >= max_read_retries {
                        return Err(LinkError::ReadRetriesExhausted {
                            attempts: consecutive_errors,
                        });
                    }
                    continue;
                }
            },
        };

        for &byte in &buf[..n] {
            // 队列满时在这里挂起，对物理读循环形成背压
            if bytes.send(byte).await.is_err() {
                return Ok(());
            }
        }
    }
}

/// 成帧阶段：字节队列 -> 消息队列
///
/// 每到一个字节就在累积缓冲上反复跑提取器，直到没有进展为止，
/// 这样缓冲里已经完整的多条报文不用等下一个字节就能全部出队。
async fn frame_stage(
    mut bytes: mpsc::Receiver<u8>,
    messages: mpsc::Sender<BoardMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let byte = tokio::select! {
            _ = shutdown.changed() => return,
            byte = bytes.recv() => match byte {
                Some(b) => b,
                // 读取阶段结束且队列抽干
                None => return,
            },
        };
        buffer.push(byte);

        loop {
            let (message, consumed) = extract_message(&buffer);
            if consumed > 0 {
                buffer.drain(..consumed);
            }
            match message {
                Some(msg) => {
                    debug!(?msg, "解出报文");
                    // 消费端落后时挂起，已成帧的消息绝不丢弃
                    if messages.send(msg).await.is_err() {
                        return;
                    }
                }
                None if consumed == 0 => break,
                None => {}
            }
        }
    }
}
