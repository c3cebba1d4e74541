//! 国际象棋搜索引擎
//!
//! 包含:
//! - 局面评估函数（中局/残局位置分混合）
//! - 走法排序（MVV-LVA、杀手走法、位置启发）
//! - Negamax + Alpha-Beta 搜索与静态搜索
//! - 置换表

mod evaluate;
mod ordering;
mod search;
mod transposition;

pub use evaluate::{Evaluator, MAX_PHASE};
pub use ordering::{KillerTable, MoveOrderer, ScoredMove, MAX_KILLER_DEPTH};
pub use search::{ConfigError, Difficulty, SearchConfig, SearchEngine, INF, MATE_SCORE};
pub use transposition::{EntryType, TTEntry, TTStats, TranspositionTable};
