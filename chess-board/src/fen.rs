//! FEN 格式解析和生成
//!
//! 格式：`<棋盘> <走子方> <易位> <过路兵> <半回合计数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`
//!
//! 半回合计数只做格式检查，不参与任何规则。

use crate::board::{Board, BoardState, CastlingRights};
use crate::constants::BOARD_SIZE;
use crate::error::{ChessError, Result};
use crate::notation::Notation;
use crate::piece::{Color, Piece, Square};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘状态
    ///
    /// 只有棋盘部分是必需的，其余字段缺省为：白方走、无易位权、无过路兵、第 1 回合。
    pub fn parse(fen: &str) -> Result<BoardState> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(invalid("Empty FEN string"));
        }

        let mut board = Self::parse_board(parts[0])?;

        let side_to_move = match parts.get(1) {
            Some(field) => {
                let mut chars = field.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Color::from_fen_char(c)
                        .ok_or_else(|| invalid(format!("Invalid side to move: {}", field)))?,
                    _ => return Err(invalid(format!("Invalid side to move: {}", field))),
                }
            }
            None => Color::White,
        };

        let castling = parts.get(2).copied().unwrap_or("-");
        Self::parse_castling(&mut board, castling)?;

        if let Some(&field) = parts.get(3) {
            if field != "-" {
                let sq = Notation::parse_square(field)
                    .map_err(|_| invalid(format!("Invalid en passant square: {}", field)))?;
                board.set_en_passant(Some(sq));
            }
        }

        if let Some(&field) = parts.get(4) {
            field
                .parse::<u32>()
                .map_err(|_| invalid(format!("Invalid halfmove clock: {}", field)))?;
        }

        let fullmove = match parts.get(5) {
            Some(field) => field
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| invalid(format!("Invalid fullmove number: {}", field)))?,
            None => 1,
        };

        let ply = (fullmove - 1)
            .checked_mul(2)
            .and_then(|ply| ply.checked_add(u32::from(side_to_move == Color::Black)))
            .ok_or_else(|| invalid(format!("Fullmove number out of range: {}", fullmove)))?;

        Ok(BoardState {
            board,
            side_to_move,
            ply,
        })
    }

    /// 解析棋盘部分（第一段对应第 8 横线，即第 0 行）
    fn parse_board(board_str: &str) -> Result<Board> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_SIZE {
            return Err(invalid(format!("Expected 8 ranks, got {}", rows.len())));
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let mut col = 0usize;

            for c in row.chars() {
                if col >= BOARD_SIZE {
                    return Err(invalid(format!("Rank {} has too many files", row_idx)));
                }

                if let Some(empty_count) = c.to_digit(10) {
                    col += empty_count as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Square::new_unchecked(row_idx as u8, col as u8), Some(piece));
                    col += 1;
                } else {
                    return Err(invalid(format!("Invalid piece character: {}", c)));
                }
            }

            if col != BOARD_SIZE {
                return Err(invalid(format!(
                    "Rank {} has {} files, expected 8",
                    row_idx, col
                )));
            }
        }

        Ok(board)
    }

    /// 易位字段转换为走动标记
    fn parse_castling(board: &mut Board, field: &str) -> Result<()> {
        let mut white = CastlingRights::LOST;
        let mut black = CastlingRights::LOST;

        if field != "-" {
            for c in field.chars() {
                let rights = match c {
                    'K' | 'Q' => &mut white,
                    'k' | 'q' => &mut black,
                    _ => return Err(invalid(format!("Invalid castling field: {}", field))),
                };
                rights.king_moved = false;
                if c.eq_ignore_ascii_case(&'k') {
                    rights.kingside_rook_moved = false;
                } else {
                    rights.queenside_rook_moved = false;
                }
            }
        }

        board.set_castling(Color::White, white);
        board.set_castling(Color::Black, black);
        Ok(())
    }

    fn castling_to_string(board: &Board) -> String {
        let mut field = String::new();
        for color in [Color::White, Color::Black] {
            let rights = board.castling(color);
            let (kingside, queenside) = match color {
                Color::White => ('K', 'Q'),
                Color::Black => ('k', 'q'),
            };
            if rights.can_castle_kingside() {
                field.push(kingside);
            }
            if rights.can_castle_queenside() {
                field.push(queenside);
            }
        }
        if field.is_empty() {
            field.push('-');
        }
        field
    }

    /// 将棋盘状态转换为 FEN 字符串
    pub fn to_string(state: &BoardState) -> String {
        let en_passant = state
            .board
            .en_passant()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {} 0 {}",
            Self::board_to_string(&state.board),
            state.side_to_move.to_fen_char(),
            Self::castling_to_string(&state.board),
            en_passant,
            state.ply / 2 + 1
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_SIZE);

        for row in 0..BOARD_SIZE as u8 {
            let mut rank = String::new();
            let mut empty_count = 0;

            for col in 0..BOARD_SIZE as u8 {
                if let Some(piece) = board.get(Square::new_unchecked(row, col)) {
                    if empty_count > 0 {
                        rank.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    rank.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                rank.push_str(&empty_count.to_string());
            }

            rows.push(rank);
        }

        rows.join("/")
    }
}

fn invalid(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_initial_fen() {
        let state = Fen::parse(INITIAL_FEN).unwrap();

        assert_eq!(state, BoardState::initial());
        assert_eq!(
            state.board.get(Square::new_unchecked(7, 4)),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            state.board.get(Square::new_unchecked(0, 3)),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
    }

    #[test]
    fn test_fen_roundtrip() {
        let fen = "r3k2r/pp3ppp/8/3pP3/8/8/PPP2PPP/R3K2R w Kq d6 0 12";
        let state = Fen::parse(fen).unwrap();

        assert_eq!(Fen::to_string(&state), fen);
        assert_eq!(state.ply, 22);
        assert_eq!(state.board.en_passant(), Some(Square::new_unchecked(2, 3)));
        assert!(state.board.castling(Color::White).can_castle_kingside());
        assert!(!state.board.castling(Color::White).can_castle_queenside());
        assert!(state.board.castling(Color::Black).can_castle_queenside());
    }

    #[test]
    fn test_parse_minimal_fen() {
        let state = Fen::parse("4k3/8/8/8/8/8/8/4K3 b").unwrap();

        assert_eq!(state.side_to_move, Color::Black);
        assert_eq!(state.ply, 1);
        assert_eq!(state.board.find_king(Color::White), Some(Square::new_unchecked(7, 4)));
        assert_eq!(state.board.find_king(Color::Black), Some(Square::new_unchecked(0, 4)));
        assert_eq!(state.board.castling(Color::White), CastlingRights::LOST);
    }

    #[test]
    fn test_invalid_fen() {
        assert!(Fen::parse("").is_err());
        // 行数不对
        assert!(Fen::parse("8/8/8").is_err());
        // 列数不对
        assert!(Fen::parse("9/8/8/8/8/8/8/8 w").is_err());
        // 无效字符
        assert!(Fen::parse("4x3/8/8/8/8/8/8/8 w").is_err());
        // 无效走子方
        assert!(Fen::parse("8/8/8/8/8/8/8/8 x").is_err());
        // 无效易位字段
        assert!(Fen::parse("8/8/8/8/8/8/8/8 w KX").is_err());
        // 无效过路兵格
        assert!(Fen::parse("8/8/8/8/8/8/8/8 w - z9").is_err());
        // 回合数从 1 开始
        assert!(Fen::parse("8/8/8/8/8/8/8/8 w - - 0 0").is_err());
    }

    #[test]
    fn test_fullmove_out_of_range() {
        let err = Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295").unwrap_err();
        assert!(matches!(err, ChessError::InvalidFen { .. }));
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 b - - 0 2147483649").is_err());

        // 最大可表示的回合数
        let state = Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 2147483648").unwrap();
        assert_eq!(state.ply, u32::MAX - 1);
    }
}
