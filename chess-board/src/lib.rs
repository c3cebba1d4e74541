//! 国际象棋棋盘库
//!
//! 包含:
//! - 棋子、格子、棋盘等核心数据结构
//! - 走法生成和规则验证（易位、吃过路兵、升变）
//! - Zobrist 局面指纹
//! - FEN 与坐标记号

mod board;
mod constants;
mod error;
mod fen;
mod moves;
mod notation;
mod piece;
mod zobrist;

pub use board::{Board, BoardState, CastlingRights, MoveRecord};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use moves::{Move, MoveGenerator, Promotion};
pub use notation::Notation;
pub use piece::{Color, Piece, PieceKind, Square};
pub use zobrist::ZobristTable;
