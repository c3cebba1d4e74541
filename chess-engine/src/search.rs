//! 搜索引擎
//!
//! 实现 Negamax + Alpha-Beta 剪枝 + 静态搜索 + 置换表

use std::str::FromStr;

use chess_board::{BoardState, Move, PieceKind, Promotion};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::evaluate::Evaluator;
use crate::ordering::{KillerTable, MoveOrderer, MAX_KILLER_DEPTH};
use crate::transposition::{EntryType, TranspositionTable};

/// 搜索窗口边界
pub const INF: i32 = 1_000_000;

/// 将杀基础分
pub const MATE_SCORE: i32 = 100_000;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 搜索深度不在 1..=64 内
    #[error("Invalid search depth: {0} (expected 1..={max})", max = MAX_KILLER_DEPTH)]
    InvalidDepth(u32),

    /// 无法识别的难度名
    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// 配置文件格式错误
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// 难度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// 对应的搜索深度
    pub fn depth(&self) -> u32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// 搜索配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub difficulty: Difficulty,
    pub max_depth: u32,
}

impl SearchConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            max_depth: difficulty.depth(),
        }
    }

    /// 指定深度（难度保持默认）
    pub fn with_depth(max_depth: u32) -> Result<Self, ConfigError> {
        let config = Self {
            max_depth,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 解析，缺省的 `max_depth` 取难度对应的深度
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            difficulty: Difficulty,
            max_depth: Option<u32>,
        }

        let raw: Raw = serde_json::from_str(json)?;
        let config = Self {
            difficulty: raw.difficulty,
            max_depth: raw.max_depth.unwrap_or(raw.difficulty.depth()),
        };
        config.validate()?;
        Ok(config)
    }

    /// 检查搜索深度
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth as usize > MAX_KILLER_DEPTH {
            return Err(ConfigError::InvalidDepth(self.max_depth));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// 搜索引擎
///
/// 置换表在多次搜索之间保留，杀手走法表每次搜索重新创建。
pub struct SearchEngine {
    config: SearchConfig,
    tt: TranspositionTable,
    nodes_searched: u64,
}

impl SearchEngine {
    /// 创建新的搜索引擎
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            tt: TranspositionTable::new(),
            nodes_searched: 0,
        }
    }

    /// 从难度创建
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(SearchConfig::from_difficulty(difficulty))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 按配置深度搜索最佳走法
    pub fn search(&mut self, state: &BoardState) -> Option<Move> {
        self.find_best_move(state, self.config.max_depth)
    }

    /// 搜索最佳走法，无合法走法时返回 None
    ///
    /// 根节点每个走法都用完整窗口搜索，同分时保留先出现的走法。
    pub fn find_best_move(&mut self, state: &BoardState, depth: u32) -> Option<Move> {
        self.nodes_searched = 0;
        let mut killers = KillerTable::new();
        let mut best: Option<(Move, i32)> = None;

        for mv in MoveOrderer::new(state, depth, &killers) {
            let Some(child) = Self::child_state(state, mv) else {
                continue;
            };

            let score = -self.alpha_beta(&child, depth.saturating_sub(1), -INF, INF, &mut killers);
            debug!(depth, mv = %mv, score, "root move searched");

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        match best {
            Some((mv, score)) => info!(
                depth,
                best = %mv,
                score,
                nodes = self.nodes_searched,
                tt_entries = self.tt.len(),
                "search complete"
            ),
            None => info!(depth, "no legal moves"),
        }

        best.map(|(mv, _)| mv)
    }

    /// Alpha-Beta 搜索（返回走子方视角的分数）
    ///
    /// 置换表中有足够深度的条目时直接返回，不做将杀判断。
    /// 结果一律以精确值存入置换表，截断得到的边界也当作精确值。
    pub fn alpha_beta(
        &mut self,
        state: &BoardState,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        killers: &mut KillerTable,
    ) -> i32 {
        self.nodes_searched += 1;

        let hash = state.hash();
        if let Some(entry) = self.tt.probe(hash, depth) {
            return entry.score;
        }

        if depth == 0 {
            let score = self.quiescence(state, alpha, beta);
            self.tt.store(hash, 0, score, EntryType::Exact);
            return score;
        }

        let orderer = MoveOrderer::new(state, depth, killers);
        if orderer.len() == 0 {
            // 剩余深度越大说明被杀得越快
            return if state.is_in_check() {
                -(MATE_SCORE + depth as i32)
            } else {
                0
            };
        }

        let mut best_score = -INF;
        for mv in orderer {
            let Some(child) = Self::child_state(state, mv) else {
                continue;
            };
            let is_capture = mv.is_capture(&state.board);

            let score = -self.alpha_beta(&child, depth - 1, -beta, -alpha, killers);

            best_score = best_score.max(score);
            alpha = alpha.max(score);

            if beta <= alpha {
                trace!(depth, mv = %mv, score, "beta cutoff");
                if !is_capture {
                    killers.add(mv, depth);
                }
                break;
            }
        }

        self.tt.store(hash, depth, best_score, EntryType::Exact);
        best_score
    }

    /// 静态搜索（只搜索吃子走法）
    fn quiescence(&mut self, state: &BoardState, mut alpha: i32, beta: i32) -> i32 {
        self.nodes_searched += 1;

        let stand_pat = Evaluator::evaluate(state);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        for mv in MoveOrderer::captures(state) {
            let Some(child) = Self::child_state(state, mv) else {
                continue;
            };

            let score = -self.quiescence(&child, -beta, -alpha);

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// 以完整窗口做静态搜索
    pub fn quiescence_eval(&mut self, state: &BoardState) -> i32 {
        self.quiescence(state, -INF, INF)
    }

    /// 执行搜索中的走法并切换走子方
    ///
    /// 兵到达底线时升变为标记的棋子，没有标记则升变为后。
    pub fn apply_search_move(state: &BoardState, mv: Move) -> chess_board::Result<BoardState> {
        let mut child = state.clone();

        let mv = match child.board.get(mv.from) {
            Some(piece)
                if piece.kind == PieceKind::Pawn && mv.to.row == piece.color.promotion_row() =>
            {
                Move {
                    promotion: Some(mv.promotion.unwrap_or(Promotion::Queen)),
                    ..mv
                }
            }
            _ => mv,
        };

        child.play(mv)?;
        Ok(child)
    }

    fn child_state(state: &BoardState, mv: Move) -> Option<BoardState> {
        match Self::apply_search_move(state, mv) {
            Ok(child) => Some(child),
            Err(err) => {
                warn!(mv = %mv, error = %err, "skipping unplayable move");
                None
            }
        }
    }

    /// 获取搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn transposition_table_mut(&mut self) -> &mut TranspositionTable {
        &mut self.tt
    }

    /// 清空置换表
    pub fn clear_cache(&mut self) {
        self.tt.clear();
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
