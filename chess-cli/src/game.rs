//! 对局控制
//!
//! 记录走法历史、判断终局，并提供引擎自对弈循环。

use chess_board::{BoardState, ChessError, Color, Move, Notation};
use chess_engine::SearchEngine;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// 对局错误
#[derive(Error, Debug)]
pub enum GameError {
    /// 走法在当前局面不合法
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// 对局已经结束
    #[error("Game is already over: {0:?}")]
    GameOver(GameStatus),

    #[error(transparent)]
    Board(#[from] ChessError),
}

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameStatus {
    /// 进行中
    Ongoing,
    /// 将死
    Checkmate { winner: Color },
    /// 无子可动
    Stalemate,
    /// 达到步数上限
    PlyLimit,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        *self != GameStatus::Ongoing
    }
}

/// 对局摘要（自对弈结束后输出）
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub moves: Vec<String>,
    pub plies: usize,
    pub result: GameStatus,
}

/// 对局
#[derive(Debug, Clone)]
pub struct Game {
    state: BoardState,
    history: Vec<Move>,
}

impl Game {
    /// 从初始局面开始
    pub fn new() -> Self {
        Self::from_state(BoardState::initial())
    }

    /// 从指定局面开始
    pub fn from_state(state: BoardState) -> Self {
        Self {
            state,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// 当前局面的终局判断
    pub fn status(&self) -> GameStatus {
        if !self.state.legal_moves().is_empty() {
            GameStatus::Ongoing
        } else if self.state.is_in_check() {
            GameStatus::Checkmate {
                winner: self.state.side_to_move.opponent(),
            }
        } else {
            GameStatus::Stalemate
        }
    }

    /// 走一步（检查合法性，兵到底线默认升变为后）
    pub fn play(&mut self, mv: Move) -> Result<(), GameError> {
        let status = self.status();
        if status.is_over() {
            return Err(GameError::GameOver(status));
        }
        if !self.state.legal_moves().contains(&mv) {
            return Err(GameError::IllegalMove(Notation::to_coordinate(&mv)));
        }

        self.state = SearchEngine::apply_search_move(&self.state, mv)?;
        self.history.push(mv);
        Ok(())
    }

    /// 引擎自对弈，直到终局或达到步数上限
    pub fn self_play(&mut self, engine: &mut SearchEngine, max_plies: usize) -> GameStatus {
        loop {
            let status = self.status();
            if status.is_over() {
                return status;
            }
            if self.history.len() >= max_plies {
                return GameStatus::PlyLimit;
            }

            let Some(mv) = engine.search(&self.state) else {
                return self.status();
            };
            let side = self.state.side_to_move;
            if let Err(err) = self.play(mv) {
                // 引擎只会给出合法走法
                tracing::error!(mv = %mv, error = %err, "engine produced an unplayable move");
                return self.status();
            }
            info!(
                ply = self.history.len(),
                side = ?side,
                mv = %mv,
                nodes = engine.nodes_searched(),
                "move played"
            );
        }
    }

    /// 对局摘要
    pub fn summary(&self, result: GameStatus) -> GameSummary {
        GameSummary {
            moves: self.history.iter().map(Notation::to_coordinate).collect(),
            plies: self.history.len(),
            result,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_board::Fen;
    use chess_engine::{Difficulty, SearchConfig};

    #[test]
    fn test_play_legal_and_illegal() {
        let mut game = Game::new();
        game.play(Notation::parse_move("e2e4").unwrap()).unwrap();
        assert_eq!(game.state().side_to_move, Color::Black);

        let err = game.play(Notation::parse_move("e4e5").unwrap()).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(ref s) if s == "e4e5"));
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_status_detection() {
        let mate = Fen::parse("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 30").unwrap();
        assert_eq!(
            Game::from_state(mate).status(),
            GameStatus::Checkmate {
                winner: Color::White
            }
        );

        let stalemate = Fen::parse("k7/8/1Q6/8/8/8/8/2K5 b - - 0 40").unwrap();
        assert_eq!(Game::from_state(stalemate).status(), GameStatus::Stalemate);
        assert_eq!(Game::new().status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_play_after_game_over() {
        let mate = Fen::parse("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 30").unwrap();
        let mut game = Game::from_state(mate);
        let err = game.play(Notation::parse_move("g8h8").unwrap()).unwrap_err();
        assert!(matches!(err, GameError::GameOver(GameStatus::Checkmate { .. })));
    }

    #[test]
    fn test_self_play_finds_mate() {
        let state = Fen::parse("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 30").unwrap();
        let mut game = Game::from_state(state);
        let mut engine = SearchEngine::new(SearchConfig::with_depth(2).unwrap());

        let result = game.self_play(&mut engine, 10);
        assert_eq!(
            result,
            GameStatus::Checkmate {
                winner: Color::White
            }
        );
        assert_eq!(game.summary(result).moves, vec!["a1a8".to_string()]);
    }

    #[test]
    fn test_self_play_ply_limit() {
        let mut game = Game::new();
        let mut engine = SearchEngine::from_difficulty(Difficulty::Easy);
        engine.clear_cache();

        let result = game.self_play(&mut engine, 2);
        assert_eq!(result, GameStatus::PlyLimit);
        assert_eq!(game.history().len(), 2);

        let json = serde_json::to_value(game.summary(result)).unwrap();
        assert_eq!(json["result"]["status"], "ply_limit");
        assert_eq!(json["plies"], 2);
    }
}
