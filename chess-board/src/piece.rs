//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::constants::{BLACK_BACK_ROW, BLACK_PAWN_ROW, BOARD_SIZE, WHITE_BACK_ROW, WHITE_PAWN_ROW};
use crate::error::{ChessError, Result};

/// 棋子类型
///
/// 判别值与带符号整数编码一致：1 兵、2 车、3 马、4 象、5 后、6 王。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn = 1,
    Rook = 2,
    Knight = 3,
    Bishop = 4,
    Queen = 5,
    King = 6,
}

impl PieceKind {
    /// 全部棋子类型，按编码顺序
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// 获取棋子的基础分值（用于子力评估和 MVV-LVA 排序）
    pub fn value(&self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20000,
        }
    }

    /// 编码绝对值（1-6）
    pub fn code(&self) -> i8 {
        *self as i8
    }

    /// 从编码绝对值解析
    pub fn from_code(code: i8) -> Option<PieceKind> {
        match code {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Rook),
            3 => Some(PieceKind::Knight),
            4 => Some(PieceKind::Bishop),
            5 => Some(PieceKind::Queen),
            6 => Some(PieceKind::King),
            _ => None,
        }
    }

    /// 是否为轻子（马、象）
    pub fn is_minor(&self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop)
    }

    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, color: Color) -> char {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'r' => PieceKind::Rook,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some((kind, color))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 白方（先手，在下方，评估的参考方）
    White,
    /// 黑方（后手，在上方）
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 评估符号：白方 +1，黑方 -1
    pub fn sign(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// 兵前进的行方向
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// 底线所在行
    pub fn back_row(&self) -> u8 {
        match self {
            Color::White => WHITE_BACK_ROW,
            Color::Black => BLACK_BACK_ROW,
        }
    }

    /// 兵的起始行
    pub fn pawn_row(&self) -> u8 {
        match self {
            Color::White => WHITE_PAWN_ROW,
            Color::Black => BLACK_PAWN_ROW,
        }
    }

    /// 兵的升变行（对方底线）
    pub fn promotion_row(&self) -> u8 {
        self.opponent().back_row()
    }

    /// 数组下标：白 0，黑 1
    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' | 'W' => Some(Color::White),
            'b' | 'B' => Some(Color::Black),
            _ => None,
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    /// 创建新棋子
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// 带符号编码：白方为正，黑方为负
    pub fn code(&self) -> i8 {
        self.kind.code() * self.color.sign() as i8
    }

    /// 从带符号编码解析，0 表示空格
    pub fn from_code(code: i8) -> Result<Option<Piece>> {
        if code == 0 {
            return Ok(None);
        }
        let kind = PieceKind::from_code(code.abs()).ok_or(ChessError::InvalidPieceCode(code))?;
        let color = if code > 0 { Color::White } else { Color::Black };
        Ok(Some(Piece::new(kind, color)))
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.color)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceKind::from_fen_char(c).map(|(kind, color)| Piece { kind, color })
    }

    /// 获取棋子分值
    pub fn value(&self) -> i32 {
        self.kind.value()
    }
}

/// 棋盘格子
///
/// 第 0 行是第 8 横线（黑方底线），第 7 行是第 1 横线（白方底线）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// 行 (0-7)
    pub row: u8,
    /// 列 (0-7)，0 为 a 线
    pub col: u8,
}

impl Square {
    /// 创建新格子
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 从任意整数坐标创建，越界时返回错误
    pub fn try_new(row: i32, col: i32) -> Result<Self> {
        if (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col) {
            Ok(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(ChessError::InvalidSquare { row, col })
        }
    }

    /// 创建新格子（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查格子是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// 获取偏移后的格子
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Square> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row >= 0 && (row as usize) < BOARD_SIZE && col >= 0 && (col as usize) < BOARD_SIZE {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// 转换为 0-63 索引
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// 从 0-63 索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_SIZE * BOARD_SIZE {
            Some(Square {
                row: (index / BOARD_SIZE) as u8,
                col: (index % BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// 上下翻转（颜色镜像时使用）
    pub fn flip(&self) -> Square {
        Square {
            row: (BOARD_SIZE - 1) as u8 - self.row,
            col: self.col,
        }
    }

    /// 以指定阵营视角的横线序号（0 为己方底线）
    pub fn relative_rank(&self, color: Color) -> u8 {
        match color {
            Color::White => (BOARD_SIZE - 1) as u8 - self.row,
            Color::Black => self.row,
        }
    }

    /// 横线数字（1-8）
    pub fn rank(&self) -> u8 {
        BOARD_SIZE as u8 - self.row
    }

    /// 纵线字母（a-h）
    pub fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    /// 是否位于棋盘边线 a/h 纵线
    pub fn is_edge_file(&self) -> bool {
        self.col == 0 || self.col as usize == BOARD_SIZE - 1
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_code_roundtrip() {
        for kind in PieceKind::ALL {
            for color in [Color::White, Color::Black] {
                let piece = Piece::new(kind, color);
                assert_eq!(Piece::from_code(piece.code()), Ok(Some(piece)));
            }
        }
        assert_eq!(Piece::from_code(0), Ok(None));
        assert_eq!(Piece::from_code(-5).unwrap(), Some(Piece::new(PieceKind::Queen, Color::Black)));
    }

    #[test]
    fn test_invalid_piece_code() {
        assert_eq!(Piece::from_code(7), Err(ChessError::InvalidPieceCode(7)));
        assert_eq!(Piece::from_code(-9), Err(ChessError::InvalidPieceCode(-9)));
    }

    #[test]
    fn test_piece_fen_char() {
        let white_king = Piece::new(PieceKind::King, Color::White);
        assert_eq!(white_king.to_fen_char(), 'K');

        let black_knight = Piece::new(PieceKind::Knight, Color::Black);
        assert_eq!(black_knight.to_fen_char(), 'n');

        assert_eq!(
            Piece::from_fen_char('R'),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn test_square_valid() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert_eq!(
            Square::try_new(-1, 3),
            Err(ChessError::InvalidSquare { row: -1, col: 3 })
        );
    }

    #[test]
    fn test_square_index() {
        let sq = Square::new_unchecked(6, 4);
        assert_eq!(sq.to_index(), 52);
        assert_eq!(Square::from_index(52), Some(sq));
        assert_eq!(Square::from_index(64), None);
    }

    #[test]
    fn test_square_display() {
        assert_eq!(Square::new_unchecked(7, 0).to_string(), "a1");
        assert_eq!(Square::new_unchecked(0, 7).to_string(), "h8");
        assert_eq!(Square::new_unchecked(6, 4).to_string(), "e2");
    }

    #[test]
    fn test_relative_rank() {
        let e2 = Square::new_unchecked(6, 4);
        assert_eq!(e2.relative_rank(Color::White), 1);
        assert_eq!(e2.flip().relative_rank(Color::Black), 1);
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.promotion_row(), 0);
        assert_eq!(Color::Black.promotion_row(), 7);
    }
}
