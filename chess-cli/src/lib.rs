//! 国际象棋命令行前端
//!
//! 包含:
//! - 对局控制与终局判断
//! - 引擎自对弈

pub mod game;

pub use game::{Game, GameError, GameStatus, GameSummary};
