//! 协议常量定义

/// 消息起始标志位（报文首字节的最高位）
pub const MESSAGE_BIT: u8 = 0x80;

/// 报文字节数据掩码（低 7 位有效）
pub const MESSAGE_MASK: u8 = 0x7f;

/// 报文头长度：1 字节命令 + 2 字节长度
pub const HEADER_LEN: usize = 3;

/// 报文最大长度。长度字段仅 14 位有效，这是协议上限，不是运行时配置
pub const MAX_MESSAGE_LEN: usize = 0x3fff;

// === 入站消息码（已掩码） ===

/// 保活消息，仅 3 字节报文头
pub const MSG_NONE: u8 = 0x00;

/// 整盘快照，载荷为 64 字节棋子码
pub const MSG_BOARD_DUMP: u8 = 0x06;

/// 单格变化，载荷为 2 字节（格子编码 + 棋子码）
pub const MSG_FIELD_UPDATE: u8 = 0x0e;

// === 出站单字节命令 ===

/// 复位棋盘
pub const CMD_SEND_RESET: u8 = 0x40;

/// 请求整盘快照
pub const CMD_SEND_BOARD: u8 = 0x42;

/// 请求增量更新模式
pub const CMD_SEND_UPDATE_BOARD: u8 = 0x44;

// === 载荷长度 ===

/// 整盘快照载荷：每格 1 字节
pub const BOARD_DUMP_PAYLOAD_LEN: usize = 64;

/// 单格变化载荷
pub const FIELD_UPDATE_PAYLOAD_LEN: usize = 2;

/// 棋盘格数
pub const BOARD_SQUARES: usize = 64;

// === 棋子码表（13 项：白 6 + 黑 6 + 空） ===

pub const PIECE_EMPTY: u8 = 0x00;
pub const PIECE_WPAWN: u8 = 0x01;
pub const PIECE_WROOK: u8 = 0x02;
pub const PIECE_WKNIGHT: u8 = 0x03;
pub const PIECE_WBISHOP: u8 = 0x04;
pub const PIECE_WKING: u8 = 0x05;
pub const PIECE_WQUEEN: u8 = 0x06;
pub const PIECE_BPAWN: u8 = 0x07;
pub const PIECE_BROOK: u8 = 0x08;
pub const PIECE_BKNIGHT: u8 = 0x09;
pub const PIECE_BBISHOP: u8 = 0x0a;
pub const PIECE_BKING: u8 = 0x0b;
pub const PIECE_BQUEEN: u8 = 0x0c;

// === 管线默认参数 ===

/// 字节队列容量（吸收串口突发）
pub const BYTE_QUEUE_CAPACITY: usize = 2048;

/// 消息队列容量
pub const MESSAGE_QUEUE_CAPACITY: usize = 2048;

/// 默认波特率（8 数据位，1 停止位，无校验）
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// 连续读错误上限，超过则判定连接失效
pub const DEFAULT_MAX_READ_RETRIES: u32 = 32;
