//! 走法推断：把整盘快照还原成实际下出的走法
//!
//! 核心思路：枚举当前局面的全部合法走法，逐一落子后投影成布局串，
//! 与快照比对，第一个相等的即为接受的走法。
//!
//! 仅凭当前局面会在一种物理场景下失败：棋子被缓慢拖过若干中间格，
//! 其中某个中间格先被当成一步走法接受，后续快照就全都对不上了。
//! 因此额外保留恰好一个"上一个被接受的局面"作为回退窗口：快照对
//! 不上当前局面时，再对一次上一局面的合法延续。回退命中时上一局
//! 面刻意保持不动，同一个回退点可以被连续多张快照反复使用。

use shakmaty::{san::SanPlus, Board, Chess, Move, Piece, Position, Square};
use tracing::warn;

use protocol::{board_fen, square_from_dump_index, BoardMessage, BOARD_SQUARES, STARTING_BOARD_FEN};

/// 对局状态。只由主循环持有和修改，不跨并发阶段共享
#[derive(Debug, Default, Clone)]
pub struct MatchState {
    /// 最近一次被接受为基准的局面；对局未开始时为 None
    current: Option<Chess>,
    /// current 之前被接受的局面，即一步回退窗口
    previous: Option<Chess>,
}

/// 单格诊断差异：引擎期望的棋子 vs 快照观测到的棋子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareDiff {
    pub square: Square,
    pub expected: Option<Piece>,
    pub observed: Option<Piece>,
}

/// 一条消息经推断后的结论
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// 快照等于标准开局，对局开始
    GameStarted,
    /// 对局未开始且快照不是开局摆法
    AwaitingSetup,
    /// 接受一步走法
    MoveAccepted { mv: Move, san: String },
    /// 快照不是任何被跟踪局面的合法延续；附逐格差异诊断
    NotAMove {
        board_fen: String,
        diffs: Vec<SquareDiff>,
    },
    /// 快照连布局串都解析不了，差异诊断跳过
    PositionNotEvaluable { board_fen: String },
    /// 收到单格变化，请求一次新的整盘快照
    RequestBoardDump,
    /// 未处理的消息类型
    Unhandled { code: u8 },
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 对局是否已经开始
    pub fn game_started(&self) -> bool {
        self.current.is_some()
    }

    /// 当前基准局面的布局串（用于展示）
    pub fn current_board_fen(&self) -> Option<String> {
        self.current.as_ref().map(board_fen)
    }

    /// 处理一条棋盘消息，返回推断结论
    pub fn handle(&mut self, message: &BoardMessage) -> MatchOutcome {
        match message {
            BoardMessage::BoardDump { board_fen } => self.on_board_dump(board_fen),
            // 单格事件可能乱序到达，吃子还可能以一次拿起收尾，
            // 与其从零散事件重建走法，不如统一请求一张权威快照
            BoardMessage::FieldUpdate { .. } => MatchOutcome::RequestBoardDump,
            BoardMessage::Unhandled { code } => MatchOutcome::Unhandled { code: *code },
        }
    }

    fn on_board_dump(&mut self, dump_fen: &str) -> MatchOutcome {
        // 对局尚未开始：快照摆成标准开局就开局，否则继续等
        let Some(current) = &self.current else {
            if dump_fen == STARTING_BOARD_FEN {
                self.current = Some(Chess::default());
                return MatchOutcome::GameStarted;
            }
            return MatchOutcome::AwaitingSetup;
        };

        // 先对当前局面的合法延续
        if let Some((position, mv, san)) = match_candidate(current, dump_fen) {
            self.previous = self.current.take();
            self.current = Some(position);
            return MatchOutcome::MoveAccepted { mv, san };
        }

        // 再对回退窗口。命中时基准换成"上一局面 + 该走法"，但
        // previous 本身不动，后续快照还可以从同一点重试
        if let Some(previous) = &self.previous {
            if let Some((position, mv, san)) = match_candidate(previous, dump_fen) {
                self.current = Some(position);
                return MatchOutcome::MoveAccepted { mv, san };
            }
        }

        // 两边都对不上：产出逐格差异诊断，状态保持不变
        match self.diff_against_current(dump_fen) {
            Some(diffs) => MatchOutcome::NotAMove {
                board_fen: dump_fen.to_string(),
                diffs,
            },
            None => MatchOutcome::PositionNotEvaluable {
                board_fen: dump_fen.to_string(),
            },
        }
    }

    /// 逐格比较当前局面与快照。快照解析失败返回 None
    fn diff_against_current(&self, dump_fen: &str) -> Option<Vec<SquareDiff>> {
        let current = self.current.as_ref()?;
        let observed: Board = dump_fen.parse().ok()?;

        let mut diffs = Vec::new();
        for index in 0..BOARD_SQUARES {
            let square = square_from_dump_index(index);
            let expected = current.board().piece_at(square);
            let seen = observed.piece_at(square);
            if expected != seen {
                diffs.push(SquareDiff {
                    square,
                    expected,
                    observed: seen,
                });
            }
        }
        Some(diffs)
    }
}

/// 在 pos 的合法走法里找第一个落子后布局串等于 dump_fen 的走法
///
/// 枚举顺序就是规则引擎的固有顺序；合法局面里不应出现两个走法
/// 映射到同一布局串，真出现时先枚举到的获胜。
fn match_candidate(pos: &Chess, dump_fen: &str) -> Option<(Chess, Move, String)> {
    for mv in pos.legal_moves() {
        let candidate = match pos.clone().play(&mv) {
            Ok(p) => p,
            // 落子失败只放弃这一个候选
            Err(e) => {
                warn!(error = %e, "规则引擎落子失败");
                continue;
            }
        };
        if board_fen(&candidate) == dump_fen {
            let san = SanPlus::from_move(pos.clone(), &mv).to_string();
            return Some((candidate, mv, san));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Color, Role};

    fn dump(fen: &str) -> BoardMessage {
        BoardMessage::BoardDump {
            board_fen: fen.to_string(),
        }
    }

    /// 按起止格推进局面并返回布局串
    fn fen_after(moves: &[(Square, Square)]) -> String {
        let mut pos = Chess::default();
        for &(from, to) in moves {
            let mv = pos
                .legal_moves()
                .into_iter()
                .find(|m| m.from() == Some(from) && m.to() == to)
                .unwrap();
            pos = pos.play(&mv).unwrap();
        }
        board_fen(&pos)
    }

    #[test]
    fn test_game_starts_on_initial_dump() {
        let mut state = MatchState::new();
        assert!(!state.game_started());

        assert_eq!(
            state.handle(&dump(STARTING_BOARD_FEN)),
            MatchOutcome::GameStarted
        );
        assert!(state.game_started());
    }

    #[test]
    fn test_awaiting_setup_until_pieces_placed() {
        let mut state = MatchState::new();
        let outcome = state.handle(&dump("8/8/8/8/8/8/8/8"));
        assert_eq!(outcome, MatchOutcome::AwaitingSetup);
        assert!(!state.game_started());
    }

    #[test]
    fn test_accepts_legal_move() {
        let mut state = MatchState::new();
        state.handle(&dump(STARTING_BOARD_FEN));

        let outcome = state.handle(&dump(&fen_after(&[(Square::E2, Square::E4)])));
        match outcome {
            MatchOutcome::MoveAccepted { san, .. } => assert_eq!(san, "e4"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        // 回退窗口指向开局
        assert_eq!(board_fen(state.previous.as_ref().unwrap()), STARTING_BOARD_FEN);
        assert_eq!(state.current_board_fen().unwrap(), fen_after(&[(Square::E2, Square::E4)]));
    }

    #[test]
    fn test_lookback_recovers_slow_slide() {
        let mut state = MatchState::new();
        state.handle(&dump(STARTING_BOARD_FEN));

        // 兵从 e2 慢慢拖向 e4，途中在 e3 停顿，被当成 e3 接受
        let outcome = state.handle(&dump(&fen_after(&[(Square::E2, Square::E3)])));
        assert!(matches!(outcome, MatchOutcome::MoveAccepted { .. }));

        // 快照显示兵到了 e4：不是 e3 局面的合法延续（轮黑走），
        // 但能从回退窗口（开局）对上 e2e4
        let outcome = state.handle(&dump(&fen_after(&[(Square::E2, Square::E4)])));
        match outcome {
            MatchOutcome::MoveAccepted { san, .. } => assert_eq!(san, "e4"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(state.current_board_fen().unwrap(), fen_after(&[(Square::E2, Square::E4)]));
        // previous 保持开局不变，可以再次回退
        assert_eq!(board_fen(state.previous.as_ref().unwrap()), STARTING_BOARD_FEN);
    }

    #[test]
    fn test_unmatched_dump_reports_diffs() {
        let mut state = MatchState::new();
        state.handle(&dump(STARTING_BOARD_FEN));

        // 白后凭空挪到 e5：不是任何合法走法
        let outcome = state.handle(&dump("rnbqkbnr/pppppppp/8/4Q3/8/8/PPPPPPPP/RNB1KBNR"));
        let MatchOutcome::NotAMove { diffs, .. } = outcome else {
            panic!("expected NotAMove");
        };

        // d1 少了后，e5 多了后
        assert!(diffs.contains(&SquareDiff {
            square: Square::E5,
            expected: None,
            observed: Some(Piece {
                color: Color::White,
                role: Role::Queen
            }),
        }));
        assert!(diffs.contains(&SquareDiff {
            square: Square::D1,
            expected: Some(Piece {
                color: Color::White,
                role: Role::Queen
            }),
            observed: None,
        }));

        // 诊断不改状态
        assert_eq!(state.current_board_fen().unwrap(), STARTING_BOARD_FEN);
        assert!(state.previous.is_none());
    }

    #[test]
    fn test_unparseable_dump_skips_diff() {
        let mut state = MatchState::new();
        state.handle(&dump(STARTING_BOARD_FEN));

        let outcome = state.handle(&dump("not a board"));
        assert!(matches!(
            outcome,
            MatchOutcome::PositionNotEvaluable { .. }
        ));
        assert_eq!(state.current_board_fen().unwrap(), STARTING_BOARD_FEN);
    }

    #[test]
    fn test_field_update_requests_dump() {
        let mut state = MatchState::new();
        state.handle(&dump(STARTING_BOARD_FEN));
        let before = state.clone();

        let outcome = state.handle(&BoardMessage::FieldUpdate {
            square: Square::E2,
            piece: None,
        });
        assert_eq!(outcome, MatchOutcome::RequestBoardDump);

        // 状态不变
        assert_eq!(
            state.current_board_fen(),
            before.current_board_fen()
        );
        assert_eq!(state.previous.is_some(), before.previous.is_some());
    }

    #[test]
    fn test_unhandled_passthrough() {
        let mut state = MatchState::new();
        let outcome = state.handle(&BoardMessage::Unhandled { code: 0x21 });
        assert_eq!(outcome, MatchOutcome::Unhandled { code: 0x21 });
        assert!(!state.game_started());
    }
}
