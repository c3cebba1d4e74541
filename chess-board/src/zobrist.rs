//! Zobrist 哈希
//!
//! 为棋子位置、走子方、易位标记和过路兵纵线分配随机键，异或得到局面指纹。

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::constants::{BOARD_SIZE, SQUARE_COUNT};
use crate::piece::{Color, PieceKind};

static GLOBAL: OnceLock<ZobristTable> = OnceLock::new();

/// Zobrist 哈希表
///
/// 使用固定种子生成，同一进程内和不同进程间的指纹都一致。
pub struct ZobristTable {
    /// 棋子哈希值 [color][piece_kind][square]
    pieces: [[[u64; SQUARE_COUNT]; 6]; 2],
    /// 黑方走子时异或
    side_to_move: u64,
    /// 易位标记 [color][king, queenside_rook, kingside_rook]
    castling: [[u64; 3]; 2],
    /// 过路兵目标格所在纵线
    en_passant: [u64; BOARD_SIZE],
}

impl ZobristTable {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF_CAFE_1234);

        let mut pieces = [[[0u64; SQUARE_COUNT]; 6]; 2];
        for color in pieces.iter_mut() {
            for kind in color.iter_mut() {
                for key in kind.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let side_to_move = rng.gen();

        let mut castling = [[0u64; 3]; 2];
        for flags in castling.iter_mut() {
            for key in flags.iter_mut() {
                *key = rng.gen();
            }
        }

        let mut en_passant = [0u64; BOARD_SIZE];
        for key in en_passant.iter_mut() {
            *key = rng.gen();
        }

        Self {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    /// 进程内共享的表
    pub fn global() -> &'static ZobristTable {
        GLOBAL.get_or_init(ZobristTable::new)
    }

    /// 计算棋盘的完整哈希值
    pub fn hash(&self, board: &Board, side_to_move: Color) -> u64 {
        let mut hash = 0u64;

        for (sq, piece) in board.all_pieces() {
            hash ^= self.piece_hash(piece.color, piece.kind, sq.to_index());
        }

        if side_to_move == Color::Black {
            hash ^= self.side_to_move;
        }

        for color in [Color::White, Color::Black] {
            let rights = board.castling(color);
            let keys = &self.castling[color.index()];
            for (flag, key) in [
                rights.king_moved,
                rights.queenside_rook_moved,
                rights.kingside_rook_moved,
            ]
            .into_iter()
            .zip(keys)
            {
                if flag {
                    hash ^= key;
                }
            }
        }

        if let Some(sq) = board.en_passant() {
            hash ^= self.en_passant[sq.col as usize];
        }

        hash
    }

    /// 获取棋子的哈希值
    #[inline]
    pub fn piece_hash(&self, color: Color, kind: PieceKind, square: usize) -> u64 {
        self.pieces[color.index()][kind.code() as usize - 1][square]
    }

    /// 获取走子方切换的哈希值
    #[inline]
    pub fn side_hash(&self) -> u64 {
        self.side_to_move
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}
