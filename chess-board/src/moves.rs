//! 走法生成和验证

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::{KINGSIDE_ROOK_COL, KING_HOME_COL, QUEENSIDE_ROOK_COL};
use crate::error::{ChessError, Result};
use crate::piece::{Color, Piece, PieceKind, Square};

/// 升变目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Promotion {
    Queen = 1,
    Rook = 2,
    Knight = 3,
    Bishop = 4,
}

impl Promotion {
    /// 升变后的棋子类型
    pub fn kind(&self) -> PieceKind {
        match self {
            Promotion::Queen => PieceKind::Queen,
            Promotion::Rook => PieceKind::Rook,
            Promotion::Knight => PieceKind::Knight,
            Promotion::Bishop => PieceKind::Bishop,
        }
    }

    /// 走法编码中使用的数值（0 表示不升变）
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// 从编码解析，0 表示不升变
    pub fn from_code(code: u8) -> Result<Option<Promotion>> {
        match code {
            0 => Ok(None),
            1 => Ok(Some(Promotion::Queen)),
            2 => Ok(Some(Promotion::Rook)),
            3 => Ok(Some(Promotion::Knight)),
            4 => Ok(Some(Promotion::Bishop)),
            _ => Err(ChessError::InvalidPromotion(code)),
        }
    }

    /// 记号字母（大写）
    pub fn to_char(&self) -> char {
        match self {
            Promotion::Queen => 'Q',
            Promotion::Rook => 'R',
            Promotion::Knight => 'N',
            Promotion::Bishop => 'B',
        }
    }

    /// 从记号字母解析（大小写均可）
    pub fn from_char(c: char) -> Option<Promotion> {
        match c.to_ascii_uppercase() {
            'Q' => Some(Promotion::Queen),
            'R' => Some(Promotion::Rook),
            'N' => Some(Promotion::Knight),
            'B' => Some(Promotion::Bishop),
            _ => None,
        }
    }
}

/// 走法
///
/// 相等性与哈希只看起点和终点，升变标记不参与比较。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
    /// 升变标记
    pub promotion: Option<Promotion>,
}

impl Move {
    /// 空走法（起点终点均越界）
    pub const NULL: Move = Move {
        from: Square::new_unchecked(8, 0),
        to: Square::new_unchecked(8, 0),
        promotion: None,
    };

    /// NULL 的编码
    const NULL_CODE: u16 = u16::MAX;

    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建带升变的走法
    pub fn with_promotion(from: Square, to: Square, promotion: Promotion) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// 从 0-63 索引创建
    pub fn from_indices(from: usize, to: usize) -> Result<Self> {
        let from = Square::from_index(from).ok_or(ChessError::InvalidSquareIndex(from))?;
        let to = Square::from_index(to).ok_or(ChessError::InvalidSquareIndex(to))?;
        Ok(Self::new(from, to))
    }

    /// 是否为空走法
    pub fn is_null(&self) -> bool {
        !self.from.is_valid() || !self.to.is_valid()
    }

    /// 是否带升变标记
    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// 目标格是否有棋子（不含吃过路兵）
    pub fn is_capture(&self, board: &Board) -> bool {
        board.get(self.to).is_some()
    }

    /// 反向走法（保留升变标记）
    pub fn undo(&self) -> Move {
        Move {
            from: self.to,
            to: self.from,
            promotion: self.promotion,
        }
    }

    /// 编码为 16 位：低 6 位起点，中 6 位终点，高 4 位升变
    pub fn encode(&self) -> u16 {
        if self.is_null() {
            return Self::NULL_CODE;
        }
        let promo = self.promotion.map_or(0, |p| p.code()) as u16;
        self.from.to_index() as u16 | (self.to.to_index() as u16) << 6 | promo << 12
    }

    /// 从 16 位编码解析
    pub fn decode(code: u16) -> Result<Move> {
        if code == Self::NULL_CODE {
            return Ok(Move::NULL);
        }
        let promotion = Promotion::from_code((code >> 12) as u8)?;
        let mut mv = Self::from_indices((code & 0x3F) as usize, ((code >> 6) & 0x3F) as usize)?;
        mv.promotion = promotion;
        Ok(mv)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.to_char())?;
        }
        Ok(())
    }
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
    const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    const KNIGHT_OFFSETS: [(i8, i8); 8] = [
        (-2, -1),
        (-2, 1),
        (-1, -2),
        (-1, 2),
        (1, -2),
        (1, 2),
        (2, -1),
        (2, 1),
    ];
    const KING_OFFSETS: [(i8, i8); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    /// 生成指定阵营的所有伪合法走法（不考虑将军）
    pub fn generate_pseudo_legal(board: &Board, side: Color) -> Vec<Move> {
        board
            .pieces(side)
            .into_iter()
            .flat_map(|(sq, _)| Self::generate_piece_moves(board, sq))
            .collect()
    }

    /// 生成指定阵营的所有合法走法（过滤掉会使己方王被将军的走法）
    pub fn generate_legal(board: &Board, side: Color) -> Vec<Move> {
        let mut scratch = board.clone();

        Self::generate_pseudo_legal(board, side)
            .into_iter()
            .filter(|mv| match scratch.make_move(*mv) {
                Ok(record) => {
                    let safe = !Self::is_in_check(&scratch, side);
                    scratch.unmake_move(record);
                    safe
                }
                Err(_) => false,
            })
            .collect()
    }

    /// 生成指定格子上棋子的伪合法走法（空格返回空列表）
    pub fn generate_piece_moves(board: &Board, sq: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        if let Some(piece) = board.get(sq) {
            Self::piece_moves(board, sq, piece, true, &mut moves);
        }
        moves
    }

    /// 攻击用走法（不含易位）
    fn generate_attacks(board: &Board, side: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);

        for (sq, piece) in board.pieces(side) {
            Self::piece_moves(board, sq, piece, false, &mut moves);
        }

        moves
    }

    fn piece_moves(
        board: &Board,
        sq: Square,
        piece: Piece,
        include_castling: bool,
        moves: &mut Vec<Move>,
    ) {
        match piece.kind {
            PieceKind::Pawn => Self::generate_pawn_moves(board, sq, piece.color, moves),
            PieceKind::Knight => {
                Self::generate_step_moves(board, sq, piece.color, &Self::KNIGHT_OFFSETS, moves)
            }
            PieceKind::Bishop => {
                Self::generate_slider_moves(board, sq, piece.color, &Self::BISHOP_DIRECTIONS, moves)
            }
            PieceKind::Rook => {
                Self::generate_slider_moves(board, sq, piece.color, &Self::ROOK_DIRECTIONS, moves)
            }
            PieceKind::Queen => {
                Self::generate_slider_moves(board, sq, piece.color, &Self::ROOK_DIRECTIONS, moves);
                Self::generate_slider_moves(board, sq, piece.color, &Self::BISHOP_DIRECTIONS, moves);
            }
            PieceKind::King => {
                Self::generate_step_moves(board, sq, piece.color, &Self::KING_OFFSETS, moves);
                if include_castling {
                    Self::generate_castling_moves(board, sq, piece.color, moves);
                }
            }
        }
    }

    /// 生成兵的走法
    fn generate_pawn_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Move>) {
        let forward = color.forward();

        // 前进一步，起始行可再走一步
        if let Some(one) = from.offset(forward, 0) {
            if board.get(one).is_none() {
                moves.push(Move::new(from, one));
                if from.row == color.pawn_row() {
                    if let Some(two) = from.offset(2 * forward, 0) {
                        if board.get(two).is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        for dc in [-1i8, 1] {
            let Some(to) = from.offset(forward, dc) else {
                continue;
            };
            match board.get(to) {
                Some(target) if target.color != color => moves.push(Move::new(from, to)),
                None if board.en_passant() == Some(to) => {
                    // 被吃的兵与本兵同一行
                    let victim = board.get(Square::new_unchecked(from.row, to.col));
                    if victim == Some(Piece::new(PieceKind::Pawn, color.opponent())) {
                        moves.push(Move::new(from, to));
                    }
                }
                _ => {}
            }
        }
    }

    /// 生成马、王的单步走法
    fn generate_step_moves(
        board: &Board,
        from: Square,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                Self::try_add_move(board, from, to, color, moves);
            }
        }
    }

    /// 生成车、象、后的滑动走法
    fn generate_slider_moves(
        board: &Board,
        from: Square,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in directions {
            let mut current = from;
            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.get(to) {
                    if target.color != color {
                        moves.push(Move::new(from, to));
                    }
                    break;
                }
                moves.push(Move::new(from, to));
                current = to;
            }
        }
    }

    /// 生成易位走法
    ///
    /// 要求王、车标记未置位且都在初始格，中间格为空，王当前未被将军。
    /// 王经过的格子是否被攻击不做检查。
    fn generate_castling_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Move>) {
        let back = color.back_row();
        if from != Square::new_unchecked(back, KING_HOME_COL) {
            return;
        }
        let rights = board.castling(color);
        if rights.king_moved {
            return;
        }

        let rook = Some(Piece::new(PieceKind::Rook, color));
        let empty = |cols: &[u8]| {
            cols.iter()
                .all(|&col| board.get(Square::new_unchecked(back, col)).is_none())
        };

        let kingside = rights.can_castle_kingside()
            && board.get(Square::new_unchecked(back, KINGSIDE_ROOK_COL)) == rook
            && empty(&[5, 6]);
        let queenside = rights.can_castle_queenside()
            && board.get(Square::new_unchecked(back, QUEENSIDE_ROOK_COL)) == rook
            && empty(&[1, 2, 3]);

        if !kingside && !queenside {
            return;
        }
        if Self::is_in_check(board, color) {
            return;
        }

        if kingside {
            moves.push(Move::new(from, Square::new_unchecked(back, KING_HOME_COL + 2)));
        }
        if queenside {
            moves.push(Move::new(from, Square::new_unchecked(back, KING_HOME_COL - 2)));
        }
    }

    /// 尝试添加走法（目标格为空或有对方棋子）
    fn try_add_move(board: &Board, from: Square, to: Square, color: Color, moves: &mut Vec<Move>) {
        match board.get(to) {
            Some(target) if target.color == color => {}
            _ => moves.push(Move::new(from, to)),
        }
    }

    /// 指定格子是否被某一方的伪合法走法（不含易位）攻击
    pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
        Self::generate_attacks(board, by)
            .iter()
            .any(|mv| mv.to == sq)
    }

    /// 检查指定阵营是否被将军
    pub fn is_in_check(board: &Board, side: Color) -> bool {
        let king_sq = match board.find_king(side) {
            Some(sq) => sq,
            None => return false, // 没有王，视为不被将军
        };

        Self::is_square_attacked(board, king_sq, side.opponent())
    }

    /// 检查是否被将死
    pub fn is_checkmate(board: &Board, side: Color) -> bool {
        Self::is_in_check(board, side) && Self::generate_legal(board, side).is_empty()
    }

    /// 检查是否无子可动（未被将军）
    pub fn is_stalemate(board: &Board, side: Color) -> bool {
        !Self::is_in_check(board, side) && Self::generate_legal(board, side).is_empty()
    }
}
