//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, KINGSIDE_ROOK_COL, KING_HOME_COL, QUEENSIDE_ROOK_COL};
use crate::error::{ChessError, Result};
use crate::moves::{Move, MoveGenerator};
use crate::piece::{Color, Piece, PieceKind, Square};
use crate::zobrist::ZobristTable;

/// 单方的易位相关标记
///
/// 标记只会在走子时由 false 变为 true，悔棋时整体恢复快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    /// 王是否走过
    pub king_moved: bool,
    /// 后翼车（a 线）是否走过
    pub queenside_rook_moved: bool,
    /// 王翼车（h 线）是否走过
    pub kingside_rook_moved: bool,
}

impl CastlingRights {
    /// 所有标记均已置位（不能再易位）
    pub const LOST: CastlingRights = CastlingRights {
        king_moved: true,
        queenside_rook_moved: true,
        kingside_rook_moved: true,
    };

    /// 是否还能王翼易位
    pub fn can_castle_kingside(&self) -> bool {
        !self.king_moved && !self.kingside_rook_moved
    }

    /// 是否还能后翼易位
    pub fn can_castle_queenside(&self) -> bool {
        !self.king_moved && !self.queenside_rook_moved
    }
}

/// 一步走法的撤销信息
///
/// 由 [`Board::make_move`] 返回，交给 [`Board::unmake_move`] 恢复走子前的完整状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    /// 执行的走法
    pub mv: Move,
    /// 走动的棋子（升变前）
    pub moved: Piece,
    /// 被吃的棋子及其所在格（吃过路兵时不是目标格）
    pub captured: Option<(Square, Piece)>,
    /// 易位时车的移动
    pub rook_move: Option<(Square, Square)>,
    prev_castling: [CastlingRights; 2],
    prev_en_passant: Option<Square>,
    prev_last_move: Option<Move>,
}

impl MoveRecord {
    /// 被吃的棋子
    pub fn captured_piece(&self) -> Option<Piece> {
        self.captured.map(|(_, piece)| piece)
    }
}

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，按 [row][col] 索引
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
    /// 易位标记，按 Color::index 索引
    castling: [CastlingRights; 2],
    /// 吃过路兵的目标格（上一步双步推兵越过的格子）
    en_passant: Option<Square>,
    /// 最近一步走法
    last_move: Option<Move>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
            castling: [CastlingRights::default(); 2],
            en_passant: None,
            last_move: None,
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for color in [Color::White, Color::Black] {
            for (col, kind) in back_rank.iter().enumerate() {
                board.set(
                    Square::new_unchecked(color.back_row(), col as u8),
                    Some(Piece::new(*kind, color)),
                );
                board.set(
                    Square::new_unchecked(color.pawn_row(), col as u8),
                    Some(Piece::new(PieceKind::Pawn, color)),
                );
            }
        }

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if sq.is_valid() {
            self.squares[sq.row as usize][sq.col as usize]
        } else {
            None
        }
    }

    /// 设置指定格子的棋子
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.squares[sq.row as usize][sq.col as usize] = piece;
        }
    }

    /// 按坐标读取棋子，越界时返回错误
    pub fn piece_at(&self, row: i32, col: i32) -> Result<Option<Piece>> {
        let sq = Square::try_new(row, col)?;
        Ok(self.get(sq))
    }

    /// 按带符号编码放置棋子（0 表示清空）
    pub fn add_piece(&mut self, row: i32, col: i32, code: i8) -> Result<()> {
        let sq = Square::try_new(row, col)?;
        let piece = Piece::from_code(code)?;
        self.set(sq, piece);
        Ok(())
    }

    /// 移除指定格子的棋子，返回被移除的棋子
    pub fn remove_piece(&mut self, row: i32, col: i32) -> Result<Option<Piece>> {
        let sq = Square::try_new(row, col)?;
        let piece = self.get(sq);
        self.set(sq, None);
        Ok(piece)
    }

    /// 带符号编码的棋盘快照
    pub fn grid(&self) -> [[i8; BOARD_SIZE]; BOARD_SIZE] {
        let mut grid = [[0i8; BOARD_SIZE]; BOARD_SIZE];
        for (row, cells) in self.squares.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                grid[row][col] = cell.map_or(0, |p| p.code());
            }
        }
        grid
    }

    /// 获取易位标记
    pub fn castling(&self, color: Color) -> CastlingRights {
        self.castling[color.index()]
    }

    /// 设置易位标记（仅供局面导入使用）
    pub fn set_castling(&mut self, color: Color, rights: CastlingRights) {
        self.castling[color.index()] = rights;
    }

    /// 吃过路兵的目标格
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// 设置吃过路兵的目标格（仅供局面导入使用）
    pub fn set_en_passant(&mut self, sq: Option<Square>) {
        self.en_passant = sq;
    }

    /// 最近一步走法
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// 按坐标走子（不检查规则，不处理升变）
    pub fn apply_move(
        &mut self,
        from_row: i32,
        from_col: i32,
        to_row: i32,
        to_col: i32,
    ) -> Result<MoveRecord> {
        let from = Square::try_new(from_row, from_col)?;
        let to = Square::try_new(to_row, to_col)?;
        self.make_move(Move::new(from, to))
    }

    /// 执行走法（不检查规则）
    ///
    /// 处理吃过路兵、易位时车的移动、带升变标记的兵升变，并更新易位标记和过路兵目标格。
    pub fn make_move(&mut self, mv: Move) -> Result<MoveRecord> {
        let (from, to) = (mv.from, mv.to);
        if let Some(bad) = [from, to].into_iter().find(|sq| !sq.is_valid()) {
            return Err(ChessError::InvalidSquare {
                row: bad.row as i32,
                col: bad.col as i32,
            });
        }
        let moved = self.get(from).ok_or(ChessError::NoPiece {
            row: from.row,
            col: from.col,
        })?;

        let prev_castling = self.castling;
        let prev_en_passant = self.en_passant;
        let prev_last_move = self.last_move;

        let mut captured = self.get(to).map(|p| (to, p));

        // 吃过路兵：斜走到空的过路兵目标格，被吃的兵在起始行
        if moved.kind == PieceKind::Pawn
            && from.col != to.col
            && captured.is_none()
            && self.en_passant == Some(to)
        {
            let victim_sq = Square::new_unchecked(from.row, to.col);
            if let Some(victim) = self.get(victim_sq) {
                self.set(victim_sq, None);
                captured = Some((victim_sq, victim));
            }
        }

        // 易位：王横走两格，车同步移动
        let mut rook_move = None;
        if moved.kind == PieceKind::King && from.row == to.row && from.col.abs_diff(to.col) == 2 {
            let (rook_from_col, rook_to_col) = if to.col > from.col {
                (KINGSIDE_ROOK_COL, to.col - 1)
            } else {
                (QUEENSIDE_ROOK_COL, to.col + 1)
            };
            let rook_from = Square::new_unchecked(from.row, rook_from_col);
            let rook_to = Square::new_unchecked(from.row, rook_to_col);
            if let Some(rook) = self.get(rook_from) {
                self.set(rook_from, None);
                self.set(rook_to, Some(rook));
                rook_move = Some((rook_from, rook_to));
            }
        }

        if moved.kind == PieceKind::King {
            self.castling[moved.color.index()].king_moved = true;
        }
        self.mark_rook_moved(from);

        self.en_passant = if moved.kind == PieceKind::Pawn && from.row.abs_diff(to.row) == 2 {
            Some(Square::new_unchecked((from.row + to.row) / 2, from.col))
        } else {
            None
        };

        let placed = match mv.promotion {
            Some(promotion) if moved.kind == PieceKind::Pawn => {
                Piece::new(promotion.kind(), moved.color)
            }
            _ => moved,
        };
        self.set(from, None);
        self.set(to, Some(placed));
        self.last_move = Some(mv);

        Ok(MoveRecord {
            mv,
            moved,
            captured,
            rook_move,
            prev_castling,
            prev_en_passant,
            prev_last_move,
        })
    }

    /// 撤销 [`Board::make_move`] 执行的走法
    pub fn unmake_move(&mut self, record: MoveRecord) {
        self.set(record.mv.to, None);
        self.set(record.mv.from, Some(record.moved));
        if let Some((sq, piece)) = record.captured {
            self.set(sq, Some(piece));
        }
        if let Some((rook_from, rook_to)) = record.rook_move {
            let rook = self.get(rook_to);
            self.set(rook_to, None);
            self.set(rook_from, rook);
        }
        self.castling = record.prev_castling;
        self.en_passant = record.prev_en_passant;
        self.last_move = record.prev_last_move;
    }

    /// 按起始格记录车的移动（与走动的棋子无关）
    fn mark_rook_moved(&mut self, from: Square) {
        for color in [Color::White, Color::Black] {
            if from.row != color.back_row() {
                continue;
            }
            let rights = &mut self.castling[color.index()];
            if from.col == QUEENSIDE_ROOK_COL {
                rights.queenside_rook_moved = true;
            } else if from.col == KINGSIDE_ROOK_COL {
                rights.kingside_rook_moved = true;
            }
        }
    }

    /// 查找指定阵营的王的位置
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.all_pieces()
            .into_iter()
            .find(|(_, p)| p.kind == PieceKind::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// 王是否还在初始格
    pub fn king_on_home_square(&self, color: Color) -> bool {
        self.get(Square::new_unchecked(color.back_row(), KING_HOME_COL))
            == Some(Piece::new(PieceKind::King, color))
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        let mut result = Vec::with_capacity(16);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if let Some(piece) = self.squares[row][col] {
                    if piece.color == color {
                        result.push((Square::new_unchecked(row as u8, col as u8), piece));
                    }
                }
            }
        }
        result
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        let mut result = Vec::with_capacity(32);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if let Some(piece) = self.squares[row][col] {
                    result.push((Square::new_unchecked(row as u8, col as u8), piece));
                }
            }
        }
        result
    }

    /// 局面指纹（Zobrist）
    pub fn hash(&self, side_to_move: Color) -> u64 {
        ZobristTable::global().hash(self, side_to_move)
    }

    /// 颜色与横线同时镜像后的棋盘
    pub fn mirror(&self) -> Board {
        let mut mirrored = Board::empty();
        for (sq, piece) in self.all_pieces() {
            mirrored.set(sq.flip(), Some(Piece::new(piece.kind, piece.color.opponent())));
        }
        mirrored.castling = [self.castling[1], self.castling[0]];
        mirrored.en_passant = self.en_passant.map(|sq| sq.flip());
        mirrored.last_move = self
            .last_move
            .filter(|mv| !mv.is_null())
            .map(|mv| Move {
                from: mv.from.flip(),
                to: mv.to.flip(),
                promotion: mv.promotion,
            });
        mirrored
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.squares.iter() {
            for cell in row.iter() {
                let c = cell.map_or('.', |p| p.to_fen_char());
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 完整的棋盘状态（包含走子方、半回合数）
///
/// 走子方与半回合数随棋盘一起复制，搜索中的每个节点持有独立的副本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub side_to_move: Color,
    /// 已走的半回合数
    pub ply: u32,
}

impl BoardState {
    /// 创建初始状态
    pub fn initial() -> Self {
        Self {
            board: Board::initial(),
            side_to_move: Color::White,
            ply: 0,
        }
    }

    /// 从棋盘创建状态
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            ply: 0,
        }
    }

    /// 切换走子方并推进半回合数
    pub fn switch_turn(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
        self.ply = self.ply.saturating_add(1);
    }

    /// 局面指纹（包含走子方）
    pub fn hash(&self) -> u64 {
        self.board.hash(self.side_to_move)
    }

    /// 当前走子方的合法走法
    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGenerator::generate_legal(&self.board, self.side_to_move)
    }

    /// 当前走子方是否被将军
    pub fn is_in_check(&self) -> bool {
        MoveGenerator::is_in_check(&self.board, self.side_to_move)
    }

    /// 当前走子方是否被将死
    pub fn is_checkmate(&self) -> bool {
        MoveGenerator::is_checkmate(&self.board, self.side_to_move)
    }

    /// 当前走子方是否无子可动且未被将军
    pub fn is_stalemate(&self) -> bool {
        MoveGenerator::is_stalemate(&self.board, self.side_to_move)
    }

    /// 执行走法并切换走子方
    pub fn play(&mut self, mv: Move) -> Result<MoveRecord> {
        let record = self.board.make_move(mv)?;
        self.switch_turn();
        Ok(record)
    }

    /// 颜色镜像后的状态（走子方同时交换）
    pub fn mirror(&self) -> BoardState {
        BoardState {
            board: self.board.mirror(),
            side_to_move: self.side_to_move.opponent(),
            ply: self.ply,
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Promotion;

    fn sq(row: u8, col: u8) -> Square {
        Square::new_unchecked(row, col)
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        assert_eq!(board.get(sq(7, 4)), Some(Piece::new(PieceKind::King, Color::White)));
        assert_eq!(board.get(sq(0, 4)), Some(Piece::new(PieceKind::King, Color::Black)));
        assert_eq!(board.get(sq(7, 3)), Some(Piece::new(PieceKind::Queen, Color::White)));
        assert_eq!(board.get(sq(1, 0)), Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert_eq!(board.all_pieces().len(), 32);
    }

    #[test]
    fn test_grid_codes() {
        let grid = Board::initial().grid();
        assert_eq!(grid[0], [-2, -3, -4, -5, -6, -4, -3, -2]);
        assert_eq!(grid[1], [-1; 8]);
        assert_eq!(grid[4], [0; 8]);
        assert_eq!(grid[6], [1; 8]);
        assert_eq!(grid[7], [2, 3, 4, 5, 6, 4, 3, 2]);
    }

    #[test]
    fn test_coordinates_out_of_range() {
        let mut board = Board::empty();
        assert_eq!(
            board.add_piece(8, 0, 1),
            Err(ChessError::InvalidSquare { row: 8, col: 0 })
        );
        assert!(board.piece_at(0, -1).is_err());
        assert!(board.apply_move(6, 4, 4, 9).is_err());
        assert_eq!(board.add_piece(3, 3, 12), Err(ChessError::InvalidPieceCode(12)));
    }

    #[test]
    fn test_apply_move_records_capture() {
        let mut board = Board::empty();
        board.add_piece(4, 4, 2).unwrap();
        board.add_piece(4, 0, -3).unwrap();

        let record = board.apply_move(4, 4, 4, 0).unwrap();
        assert_eq!(record.captured_piece(), Some(Piece::new(PieceKind::Knight, Color::Black)));
        assert_eq!(board.piece_at(4, 0).unwrap(), Some(Piece::new(PieceKind::Rook, Color::White)));
        assert_eq!(board.last_move(), Some(Move::new(sq(4, 4), sq(4, 0))));
    }

    #[test]
    fn test_apply_move_from_empty_square() {
        let mut board = Board::empty();
        assert_eq!(
            board.apply_move(4, 4, 3, 4),
            Err(ChessError::NoPiece { row: 4, col: 4 })
        );
    }

    #[test]
    fn test_make_unmake_restores_state() {
        let mut board = Board::initial();
        let before = board.clone();

        let record = board.apply_move(6, 4, 4, 4).unwrap();
        assert_eq!(board.en_passant(), Some(sq(5, 4)));
        board.unmake_move(record);
        assert_eq!(board, before);
    }

    #[test]
    fn test_castling_flags_only_set() {
        let mut board = Board::initial();
        board.remove_piece(7, 5).unwrap();
        board.remove_piece(7, 6).unwrap();

        board.apply_move(7, 4, 7, 5).unwrap();
        assert!(board.castling(Color::White).king_moved);
        board.apply_move(7, 5, 7, 4).unwrap();
        // 王回到原位后标记不会被清除
        assert!(board.castling(Color::White).king_moved);

        // apply_move 不检查路径是否被阻挡
        board.apply_move(0, 0, 2, 0).unwrap();
        assert!(board.castling(Color::Black).queenside_rook_moved);
    }

    #[test]
    fn test_castling_moves_rook() {
        let mut board = Board::empty();
        board.add_piece(7, 4, 6).unwrap();
        board.add_piece(7, 7, 2).unwrap();
        board.add_piece(7, 0, 2).unwrap();

        let before = board.clone();
        let record = board.apply_move(7, 4, 7, 6).unwrap();
        assert_eq!(board.piece_at(7, 5).unwrap(), Some(Piece::new(PieceKind::Rook, Color::White)));
        assert_eq!(board.piece_at(7, 7).unwrap(), None);
        assert_eq!(record.rook_move, Some((sq(7, 7), sq(7, 5))));

        board.unmake_move(record);
        assert_eq!(board, before);

        board.apply_move(7, 4, 7, 2).unwrap();
        assert_eq!(board.piece_at(7, 3).unwrap(), Some(Piece::new(PieceKind::Rook, Color::White)));
        assert_eq!(board.piece_at(7, 0).unwrap(), None);
    }

    #[test]
    fn test_en_passant_removes_pawn() {
        let mut board = Board::empty();
        board.add_piece(3, 4, 1).unwrap();
        board.add_piece(1, 3, -1).unwrap();

        board.apply_move(1, 3, 3, 3).unwrap();
        assert_eq!(board.en_passant(), Some(sq(2, 3)));

        let before = board.clone();
        let record = board.apply_move(3, 4, 2, 3).unwrap();
        assert_eq!(record.captured, Some((sq(3, 3), Piece::new(PieceKind::Pawn, Color::Black))));
        assert_eq!(board.piece_at(3, 3).unwrap(), None);
        assert_eq!(board.piece_at(2, 3).unwrap(), Some(Piece::new(PieceKind::Pawn, Color::White)));

        board.unmake_move(record);
        assert_eq!(board, before);
    }

    #[test]
    fn test_promotion_tag_replaces_pawn() {
        let mut board = Board::empty();
        board.add_piece(1, 4, 1).unwrap();

        let mv = Move::with_promotion(sq(1, 4), sq(0, 4), Promotion::Knight);
        let record = board.make_move(mv).unwrap();
        assert_eq!(board.get(sq(0, 4)), Some(Piece::new(PieceKind::Knight, Color::White)));

        board.unmake_move(record);
        assert_eq!(board.get(sq(1, 4)), Some(Piece::new(PieceKind::Pawn, Color::White)));
        assert_eq!(board.get(sq(0, 4)), None);
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Board::initial();
        let mut copy = original.clone();
        copy.apply_move(6, 4, 4, 4).unwrap();

        assert_ne!(copy, original);
        assert_eq!(original.piece_at(6, 4).unwrap(), Some(Piece::new(PieceKind::Pawn, Color::White)));
        assert_eq!(original.en_passant(), None);
    }

    #[test]
    fn test_find_king() {
        let board = Board::initial();
        assert_eq!(board.find_king(Color::White), Some(sq(7, 4)));
        assert_eq!(board.find_king(Color::Black), Some(sq(0, 4)));
        assert_eq!(Board::empty().find_king(Color::White), None);
    }

    #[test]
    fn test_mirror_is_involution() {
        let mut board = Board::initial();
        board.apply_move(6, 3, 4, 3).unwrap();
        let mirrored = board.mirror();

        assert_eq!(mirrored.get(sq(1, 3)), None);
        assert_eq!(mirrored.get(sq(3, 3)), Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert_eq!(mirrored.mirror(), board);
    }

    #[test]
    fn test_switch_turn_advances_ply() {
        let mut state = BoardState::initial();
        state.switch_turn();
        assert_eq!(state.side_to_move, Color::Black);
        assert_eq!(state.ply, 1);

        state.ply = u32::MAX;
        state.switch_turn();
        assert_eq!(state.ply, u32::MAX);
    }

    #[test]
    fn test_state_serde() {
        let mut state = BoardState::initial();
        state.play(Move::new(sq(6, 4), sq(4, 4))).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let restored: BoardState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.hash(), state.hash());
    }

    #[test]
    fn test_hash_depends_on_side() {
        let state = BoardState::initial();
        let mut other = state.clone();
        other.side_to_move = Color::Black;
        assert_ne!(state.hash(), other.hash());
        assert_eq!(state.hash(), BoardState::initial().hash());
    }
}
