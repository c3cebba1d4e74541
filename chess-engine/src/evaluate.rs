//! 棋局评估函数
//!
//! 中局/残局位置分按子力阶段混合，外加先手、机动性、开局、中心和王前兵等项。

use chess_board::{Board, BoardState, Color, MoveGenerator, Piece, PieceKind, Square};

/// 评估器
pub struct Evaluator;

/// 阶段满值（所有轻重子都在盘上）
pub const MAX_PHASE: i32 = 24;

const TEMPO_BONUS: i32 = 15;
const CENTER_PAWN_BONUS: i32 = 20;
const KING_SHIELD_PENALTY: i32 = 40;

/// 棋子位置分值表
///
/// 按 [相对横线][纵线] 索引，相对横线 0 为己方底线，两方共用同一张表。
mod position_tables {
    pub type Table = [[i32; 8]; 8];

    pub const PAWN_MG: Table = [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [3, 3, 10, 19, 16, 19, 7, -5],
        [-9, -15, 11, 15, 32, 22, 5, -22],
        [-8, -23, 6, 20, 40, 17, 4, -12],
        [13, 0, -13, 1, 11, -2, -13, 5],
        [-5, -12, -7, 22, -8, -5, -15, -18],
        [-7, 7, -3, -13, 5, -16, 10, -8],
        [0, 0, 0, 0, 0, 0, 0, 0],
    ];

    pub const PAWN_EG: Table = [
        [-10, -6, 10, 0, 14, 7, -5, -19],
        [-10, -10, -10, 4, 4, 3, -6, -4],
        [6, -2, -8, -4, -13, -12, -10, -9],
        [9, 4, 3, -12, -12, -6, 13, 8],
        [28, 20, 21, 28, 30, 7, 6, 13],
        [0, -11, 12, 21, 25, 19, 4, 7],
        [0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0],
    ];

    pub const KNIGHT_MG: Table = [
        [-175, -92, -74, -73, -73, -74, -92, -175],
        [-77, -41, -27, -15, -15, -27, -41, -77],
        [-61, -17, 6, 12, 12, 6, -17, -61],
        [-35, 8, 40, 49, 49, 40, 8, -35],
        [-34, 13, 44, 51, 51, 44, 13, -34],
        [-9, 22, 58, 53, 53, 58, 22, -9],
        [-67, -27, 4, 37, 37, 4, -27, -67],
        [-201, -83, -56, -26, -26, -56, -83, -201],
    ];

    pub const KNIGHT_EG: Table = [
        [-96, -65, -49, -21, -21, -49, -65, -96],
        [-67, -54, -18, 8, 8, -18, -54, -67],
        [-40, -27, -8, 29, 29, -8, -27, -40],
        [-35, -2, 13, 28, 28, 13, -2, -35],
        [-45, -16, 9, 39, 39, 9, -16, -45],
        [-51, -44, -16, 17, 17, -16, -44, -51],
        [-69, -50, -51, 12, 12, -51, -50, -69],
        [-100, -88, -56, -17, -17, -56, -88, -100],
    ];

    pub const BISHOP_MG: Table = [
        [-53, -5, -8, -23, -23, -8, -5, -53],
        [-15, 8, 19, 4, 4, 19, 8, -15],
        [-7, 21, -5, 17, 17, -5, 21, -7],
        [-5, 11, 25, 39, 39, 25, 11, -5],
        [-12, 29, 22, 31, 31, 22, 29, -12],
        [-16, 6, 1, 11, 11, 1, 6, -16],
        [-17, -14, 5, 0, 0, 5, -14, -17],
        [-48, 1, -14, -23, -23, -14, 1, -48],
    ];

    pub const BISHOP_EG: Table = [
        [-57, -30, -37, -12, -12, -37, -30, -57],
        [-37, -13, -17, 1, 1, -17, -13, -37],
        [-16, -1, -2, 10, 10, -2, -1, -16],
        [-20, -6, 0, 17, 17, 0, -6, -20],
        [-17, -1, -14, 15, 15, -14, -1, -17],
        [-30, 6, 4, 6, 6, 4, 6, -30],
        [-31, -20, -1, 1, 1, -1, -20, -31],
        [-46, -42, -37, -24, -24, -37, -42, -46],
    ];

    pub const ROOK_MG: Table = [
        [-31, -20, -14, -5, -5, -14, -20, -31],
        [-21, -13, -8, 6, 6, -8, -13, -21],
        [-25, -11, -1, 3, 3, -1, -11, -25],
        [-13, -5, -4, -6, -6, -4, -5, -13],
        [-27, -15, -4, 3, 3, -4, -15, -27],
        [-22, -2, 6, 12, 12, 6, -2, -22],
        [-2, 12, 16, 18, 18, 16, 12, -2],
        [-17, -19, -1, 9, 9, -1, -19, -17],
    ];

    pub const ROOK_EG: Table = [
        [-9, -13, -10, -9, -9, -10, -13, -9],
        [-12, -9, -1, -2, -2, -1, -9, -12],
        [6, -8, -2, -6, -6, -2, -8, 6],
        [-6, 1, -9, 7, 7, -9, 1, -6],
        [-5, 8, 7, -6, -6, 7, 8, -5],
        [6, 1, -7, 10, 10, -7, 1, 6],
        [4, 5, 20, -5, -5, 20, 5, 4],
        [18, 0, 19, 13, 13, 19, 0, 18],
    ];

    pub const KING_MG: Table = [
        [271, 327, 271, 198, 198, 271, 327, 271],
        [278, 303, 234, 179, 179, 234, 303, 278],
        [195, 258, 169, 120, 120, 169, 258, 195],
        [164, 190, 138, 98, 98, 138, 190, 164],
        [154, 179, 105, 70, 70, 105, 179, 154],
        [123, 145, 81, 31, 31, 81, 145, 123],
        [88, 120, 65, 33, 33, 65, 120, 88],
        [59, 89, 45, -1, -1, 45, 89, 59],
    ];

    pub const KING_EG: Table = [
        [1, 45, 85, 76, 76, 85, 45, 1],
        [53, 100, 133, 135, 135, 133, 100, 53],
        [88, 130, 169, 175, 175, 169, 130, 88],
        [103, 156, 172, 172, 172, 172, 156, 103],
        [96, 166, 199, 199, 199, 199, 166, 96],
        [92, 172, 184, 191, 191, 184, 172, 92],
        [47, 121, 116, 131, 131, 116, 121, 47],
        [11, 59, 73, 78, 78, 73, 59, 11],
    ];
}

use position_tables::Table;

impl Evaluator {
    /// 评估棋局（走子方视角，正值对走子方有利）
    pub fn evaluate(state: &BoardState) -> i32 {
        let score = Self::evaluate_absolute(state);
        match state.side_to_move {
            Color::White => score,
            Color::Black => -score,
        }
    }

    /// 评估棋局（白方视角，正值对白方有利）
    pub fn evaluate_absolute(state: &BoardState) -> i32 {
        let board = &state.board;
        let side = state.side_to_move;

        let mut mg = 0;
        let mut eg = 0;

        for (sq, piece) in board.all_pieces() {
            let (piece_mg, piece_eg) = Self::piece_score(sq, piece, state.ply);
            let sign = piece.color.sign();
            mg += sign * piece_mg;
            eg += sign * piece_eg;
        }

        let phase = Self::game_phase(board);
        let mut score = (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE;

        // 先手与机动性
        score += side.sign() * TEMPO_BONUS;
        score += side.sign() * MoveGenerator::generate_legal(board, side).len() as i32;

        if state.ply == 0 {
            for color in [Color::White, Color::Black] {
                score += color.sign() * Self::opening_score(board, color);
            }
        }

        score += Self::center_control(board);

        for color in [Color::White, Color::Black] {
            if let Some(king) = board.find_king(color) {
                if Self::pawn_shield(board, king, color) < 2 {
                    score -= color.sign() * KING_SHIELD_PENALTY;
                }
            }
        }

        score
    }

    /// 快速评估（仅计算子力差，白方视角）
    pub fn evaluate_material(board: &Board) -> i32 {
        board
            .all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.kind != PieceKind::King)
            .map(|(_, piece)| piece.color.sign() * piece.value())
            .sum()
    }

    /// 子力阶段（0 为纯残局，24 为满值）
    pub fn game_phase(board: &Board) -> i32 {
        board
            .all_pieces()
            .into_iter()
            .map(|(_, piece)| Self::phase_weight(piece.kind))
            .sum::<i32>()
            .min(MAX_PHASE)
    }

    /// 棋子在指定格子的中局位置分（己方视角），后没有位置分
    pub fn midgame_square_value(piece: Piece, sq: Square) -> i32 {
        match Self::tables(piece.kind) {
            Some((mg, _)) => Self::lookup(mg, sq, piece.color),
            None => 0,
        }
    }

    fn phase_weight(kind: PieceKind) -> i32 {
        match kind {
            PieceKind::Knight | PieceKind::Bishop => 1,
            PieceKind::Rook => 2,
            PieceKind::Queen => 4,
            PieceKind::Pawn | PieceKind::King => 0,
        }
    }

    fn tables(kind: PieceKind) -> Option<(&'static Table, &'static Table)> {
        use position_tables::*;
        match kind {
            PieceKind::Pawn => Some((&PAWN_MG, &PAWN_EG)),
            PieceKind::Knight => Some((&KNIGHT_MG, &KNIGHT_EG)),
            PieceKind::Bishop => Some((&BISHOP_MG, &BISHOP_EG)),
            PieceKind::Rook => Some((&ROOK_MG, &ROOK_EG)),
            PieceKind::King => Some((&KING_MG, &KING_EG)),
            PieceKind::Queen => None,
        }
    }

    #[inline]
    fn lookup(table: &Table, sq: Square, color: Color) -> i32 {
        table[sq.relative_rank(color) as usize][sq.col as usize]
    }

    /// 单个棋子的中局/残局分（己方视角）
    fn piece_score(sq: Square, piece: Piece, ply: u32) -> (i32, i32) {
        // 王只计位置分
        let material = match piece.kind {
            PieceKind::King => 0,
            _ => piece.value(),
        };
        let (mut mg, mut eg) = match Self::tables(piece.kind) {
            Some((mg, eg)) => (
                material + Self::lookup(mg, sq, piece.color),
                material + Self::lookup(eg, sq, piece.color),
            ),
            None => (material, material),
        };

        if piece.kind == PieceKind::Knight {
            // 开局马在边上
            if ply < 4 && (sq.is_edge_file() || sq.row == 0 || sq.row == 7) {
                mg -= 100;
                eg -= 80;
            }
            // 开局马跳到 c3/f3
            if ply < 6 && sq.relative_rank(piece.color) == 2 && (sq.col == 2 || sq.col == 5) {
                mg += 40;
                eg += 20;
            }
        }

        (mg, eg)
    }

    /// 开局中心兵加分（己方视角）
    fn opening_score(board: &Board, color: Color) -> i32 {
        let pawn = Some(Piece::new(PieceKind::Pawn, color));
        let pawn_at = |rank: u8, col: u8| board.get(relative_square(color, rank, col)) == pawn;

        let mut score = 0;
        for col in [3, 4] {
            if pawn_at(1, col) {
                score += 100;
            }
            if pawn_at(3, col) {
                score += 100;
            }
        }

        if [0, 2, 5, 7].iter().any(|&col| pawn_at(2, col)) {
            score -= 40;
        }

        if !pawn_at(3, 3) && !pawn_at(3, 4) {
            score -= 50;
        }

        score
    }

    /// d4/e4/d5/e5 上的兵（白方视角）
    fn center_control(board: &Board) -> i32 {
        let mut score = 0;
        for row in 3..=4 {
            for col in 3..=4 {
                if let Some(piece) = board.get(Square::new_unchecked(row, col)) {
                    if piece.kind == PieceKind::Pawn {
                        score += piece.color.sign() * CENTER_PAWN_BONUS;
                    }
                }
            }
        }
        score
    }

    /// 王正前方三格中己方兵的数量
    fn pawn_shield(board: &Board, king: Square, color: Color) -> usize {
        let pawn = Some(Piece::new(PieceKind::Pawn, color));
        (-1..=1)
            .filter_map(|dc| king.offset(color.forward(), dc))
            .filter(|sq| board.get(*sq) == pawn)
            .count()
    }
}

/// 相对横线（0 为己方底线）转换为格子
fn relative_square(color: Color, rank: u8, col: u8) -> Square {
    match color {
        Color::White => Square::new_unchecked(7 - rank, col),
        Color::Black => Square::new_unchecked(rank, col),
    }
}
