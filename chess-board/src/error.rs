//! 错误类型定义

use thiserror::Error;

/// 棋盘与走法相关错误
///
/// 所有错误都表示调用方传入了非法参数，属于编程错误而非可恢复的运行时状态。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 坐标越界
    #[error("Invalid square: row {row}, col {col}")]
    InvalidSquare { row: i32, col: i32 },

    /// 格子索引越界
    #[error("Invalid square index: {0}")]
    InvalidSquareIndex(usize),

    /// 无法识别的棋子编码
    #[error("Invalid piece code: {0}")]
    InvalidPieceCode(i8),

    /// 无法识别的升变编码
    #[error("Invalid promotion type: {0}")]
    InvalidPromotion(u8),

    /// 指定位置没有棋子
    #[error("No piece at row {row}, col {col}")]
    NoPiece { row: u8, col: u8 },

    /// 无法解析的走法记号
    #[error("Invalid move notation: {notation}")]
    InvalidNotation { notation: String },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },
}

/// 棋盘操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
