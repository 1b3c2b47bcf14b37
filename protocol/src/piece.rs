//! 棋子码与格子编码转换
//!
//! 棋子码表共 13 项（白 6 + 黑 6 + 空），同时服务于两种投影：
//! 整盘快照用的 FEN 字符投影，以及单格变化用的规则引擎棋子投影。
//! 表外的码一律按空格处理，不报错。

use shakmaty::{Color, File, Piece, Rank, Role, Square};

use crate::constants::*;

/// 棋子码转规则引擎棋子，空格与未知码返回 None
pub fn piece_from_code(code: u8) -> Option<Piece> {
    let (color, role) = match code {
        PIECE_WPAWN => (Color::White, Role::Pawn),
        PIECE_WKNIGHT => (Color::White, Role::Knight),
        PIECE_WBISHOP => (Color::White, Role::Bishop),
        PIECE_WROOK => (Color::White, Role::Rook),
        PIECE_WQUEEN => (Color::White, Role::Queen),
        PIECE_WKING => (Color::White, Role::King),
        PIECE_BPAWN => (Color::Black, Role::Pawn),
        PIECE_BKNIGHT => (Color::Black, Role::Knight),
        PIECE_BBISHOP => (Color::Black, Role::Bishop),
        PIECE_BROOK => (Color::Black, Role::Rook),
        PIECE_BQUEEN => (Color::Black, Role::Queen),
        PIECE_BKING => (Color::Black, Role::King),
        _ => return None,
    };
    Some(Piece { color, role })
}

/// 棋子码转 FEN 字符（白方大写，黑方小写），空格与未知码返回 None
pub fn fen_char_from_code(code: u8) -> Option<char> {
    piece_from_code(code).map(|p| p.char())
}

/// 整盘快照中的格序转格子
///
/// 快照按 FEN 图示顺序排列：a8..h8, a7..h7, ..., a1..h1。
/// 即序号 0 是 a8，序号 63 是 h1。
pub fn square_from_dump_index(index: usize) -> Square {
    debug_assert!(index < BOARD_SQUARES);
    let file = index % 8;
    let rank = 7 - index / 8;
    Square::from_coords(File::new(file as u32), Rank::new(rank as u32))
}

/// 单格变化报文中的格子编码转格子
///
/// 编码为 0b00rrrfff：低 3 位是列（0=a），第 3-5 位是行。
/// 设备从黑方一侧数行，r=0 对应第 8 行，所以要做 `7 - r` 翻转。
pub fn square_from_field_byte(encoded: u8) -> Square {
    let file = (encoded & 0x07) as u32;
    let rank = 7 - ((encoded & 0x38) >> 3) as u32;
    Square::from_coords(File::new(file), Rank::new(rank))
}
