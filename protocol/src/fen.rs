//! 局面记号（mini-FEN）的生成
//!
//! 这里只处理 FEN 的棋盘布局部分（64 格、行分隔符、空格连段折叠），
//! 不含走子方、易位权、回合数等元数据，用于和规则引擎投影出的
//! 布局串做等值比较。
//!
//! 注意本方言不省略整行空格，也不省略行尾数字：`/8/` 不会写成
//! `//`，`/4p3/` 不会写成 `/4p/`。这是刻意的，为了与规则引擎
//! 输出的布局串逐字符一致。

use shakmaty::Position;

use crate::constants::BOARD_SQUARES;

/// 标准开局的布局串
pub const STARTING_BOARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// 把规则引擎局面投影为布局串
pub fn board_fen<P: Position>(pos: &P) -> String {
    pos.board().board_fen(pos.promoted()).to_string()
}

/// 布局串构造器
///
/// 约定恰好调用 64 次 [`FenBuilder::add`]，每格一次，顺序为
/// a8..h8, a7..h7, ..., a1..h1；非空格传棋子字符，空格传 None。
/// 第 64 次之后的调用被静默忽略（容忍超长输入，不作为错误上报）。
#[derive(Debug, Default)]
pub struct FenBuilder {
    squares: Vec<Option<char>>,
}

impl FenBuilder {
    pub fn new() -> Self {
        Self {
            squares: Vec::with_capacity(BOARD_SQUARES),
        }
    }

    /// 追加一格。None 表示空格
    pub fn add(&mut self, symbol: Option<char>) {
        if self.squares.len() >= BOARD_SQUARES {
            return;
        }
        self.squares.push(symbol);
    }

    /// 折叠空格连段并插入行分隔符，产出布局串
    pub fn finish(self) -> String {
        let mut fen = String::new();
        for rank in 0..8 {
            if rank > 0 {
                fen.push('/');
            }
            let mut empty_run = 0;
            for file in 0..8 {
                match self.squares.get(rank * 8 + file).copied().flatten() {
                    Some(c) => {
                        if empty_run > 0 {
                            fen.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        fen.push(c);
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push_str(&empty_run.to_string());
            }
        }
        fen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Chess;

    fn starting_symbols() -> Vec<Option<char>> {
        let mut symbols = Vec::new();
        for c in "rnbqkbnr".chars() {
            symbols.push(Some(c));
        }
        symbols.extend(std::iter::repeat(Some('p')).take(8));
        symbols.extend(std::iter::repeat(None).take(32));
        symbols.extend(std::iter::repeat(Some('P')).take(8));
        for c in "RNBQKBNR".chars() {
            symbols.push(Some(c));
        }
        symbols
    }

    #[test]
    fn test_starting_position() {
        let mut builder = FenBuilder::new();
        for s in starting_symbols() {
            builder.add(s);
        }
        assert_eq!(builder.finish(), STARTING_BOARD_FEN);
    }

    #[test]
    fn test_matches_engine_projection() {
        assert_eq!(board_fen(&Chess::default()), STARTING_BOARD_FEN);
    }

    #[test]
    fn test_empty_board() {
        let mut builder = FenBuilder::new();
        for _ in 0..64 {
            builder.add(None);
        }
        // 整行空格不省略
        assert_eq!(builder.finish(), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn test_trailing_run_kept() {
        let mut builder = FenBuilder::new();
        for i in 0..64 {
            // 只在 e7（序号 12）放一个兵：前 4 空，兵，后 3 空
            builder.add(if i == 12 { Some('p') } else { None });
        }
        assert_eq!(builder.finish(), "8/4p3/8/8/8/8/8/8");
    }

    #[test]
    fn test_shape_invariants() {
        let mut builder = FenBuilder::new();
        for s in starting_symbols() {
            builder.add(s);
        }
        let fen = builder.finish();

        // 恰好 7 个行分隔符
        assert_eq!(fen.matches('/').count(), 7);

        // 每行数字与棋子字符合计 8 格
        for rank in fen.split('/') {
            let total: u32 = rank
                .chars()
                .map(|c| c.to_digit(10).unwrap_or(1))
                .sum();
            assert_eq!(total, 8);
        }
    }

    #[test]
    fn test_extra_adds_ignored() {
        let mut builder = FenBuilder::new();
        for s in starting_symbols() {
            builder.add(s);
        }
        // 第 65 次起的调用不生效也不崩溃
        builder.add(Some('Q'));
        builder.add(None);
        assert_eq!(builder.finish(), STARTING_BOARD_FEN);
    }
}
