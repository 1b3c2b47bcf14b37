//! 消息类型定义
//!
//! 棋盘能产生多种报文，目前解码两种：整盘快照和单格变化；其余
//! 类型保留命令码原样上报，便于诊断。每条消息恰好是其中一个变体，
//! 这是分发方依赖的结构性约定。

use shakmaty::{Piece, Square};

use crate::constants::{BOARD_DUMP_PAYLOAD_LEN, FIELD_UPDATE_PAYLOAD_LEN};
use crate::fen::FenBuilder;
use crate::piece::{fen_char_from_code, piece_from_code, square_from_field_byte};

/// 棋盘发来的一条离散消息，已从字节表示翻译为上层形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardMessage {
    /// 整盘快照，已编码为布局串
    BoardDump { board_fen: String },
    /// 单格占用变化。None 表示该格被拿空
    FieldUpdate {
        square: Square,
        piece: Option<Piece>,
    },
    /// 已识别但未实现（或未知）的消息，保留命令码
    Unhandled { code: u8 },
}

impl BoardMessage {
    /// 解码整盘快照载荷：64 字节棋子码，顺序 a8..h1
    pub(crate) fn board_dump(payload: &[u8]) -> Self {
        debug_assert_eq!(payload.len(), BOARD_DUMP_PAYLOAD_LEN);
        let mut builder = FenBuilder::new();
        for &code in payload {
            builder.add(fen_char_from_code(code));
        }
        BoardMessage::BoardDump {
            board_fen: builder.finish(),
        }
    }

    /// 解码单格变化载荷：格子编码 + 棋子码
    pub(crate) fn field_update(payload: &[u8]) -> Self {
        debug_assert_eq!(payload.len(), FIELD_UPDATE_PAYLOAD_LEN);
        BoardMessage::FieldUpdate {
            square: square_from_field_byte(payload[0]),
            piece: piece_from_code(payload[1]),
        }
    }
}
