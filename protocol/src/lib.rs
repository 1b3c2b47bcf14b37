//! 传感棋盘串口协议库
//!
//! 包含:
//! - 协议常量与 13 项棋子码表
//! - 棋子码、格子编码与规则引擎类型的转换
//! - 布局串（mini-FEN）构造器
//! - 消息类型定义 (BoardMessage)
//! - 报文提取状态机 (extract_message)
//! - 链路错误类型

mod constants;
mod error;
mod extractor;
mod fen;
mod message;
mod piece;

pub use constants::*;
pub use error::{LinkError, Result};
pub use extractor::extract_message;
pub use fen::{board_fen, FenBuilder, STARTING_BOARD_FEN};
pub use message::BoardMessage;
pub use piece::{
    fen_char_from_code, piece_from_code, square_from_dump_index, square_from_field_byte,
};
