//! 走法排序
//!
//! 为合法走法打分并按分数从高到低输出，分数越高越先被搜索。

use chess_board::{Board, BoardState, Color, Move, MoveGenerator, PieceKind, Promotion};

use crate::evaluate::Evaluator;

/// 杀手走法表的最大深度
pub const MAX_KILLER_DEPTH: usize = 64;

/// 吃子基础分
const CAPTURE_BASE: i32 = 1000;
/// 杀手走法分
const KILLER_SCORE: i32 = 900;
/// 升变分
const PROMOTION_SCORE: i32 = 800;

/// 杀手走法表
///
/// 每个深度保存最近两个造成截断的非吃子走法，只在一次搜索内有效。
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Option<Move>; 2]; MAX_KILLER_DEPTH],
}

impl KillerTable {
    /// 创建空表
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_KILLER_DEPTH],
        }
    }

    /// 记录杀手走法
    ///
    /// 与当前首选相同时不变，否则成为新首选，原首选降为次选。超出最大深度时忽略。
    pub fn add(&mut self, mv: Move, depth: u32) {
        let Some(slot) = self.slots.get_mut(depth as usize) else {
            return;
        };
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    /// 指定深度的两个杀手走法（首选、次选）
    pub fn get(&self, depth: u32) -> [Option<Move>; 2] {
        self.slots
            .get(depth as usize)
            .copied()
            .unwrap_or([None; 2])
    }

    /// 走法是否为指定深度的杀手走法
    pub fn contains(&self, depth: u32, mv: Move) -> bool {
        self.get(depth).contains(&Some(mv))
    }

    /// 清空
    pub fn clear(&mut self) {
        self.slots = [[None; 2]; MAX_KILLER_DEPTH];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// 带分数的走法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// 走法排序器
///
/// 构造时生成并排序全部走法，之后按顺序逐个取出，不能重置。
#[derive(Debug)]
pub struct MoveOrderer {
    moves: Vec<ScoredMove>,
    index: usize,
}

impl MoveOrderer {
    /// 当前走子方的所有合法走法
    pub fn new(state: &BoardState, depth: u32, killers: &KillerTable) -> Self {
        Self::build(state, depth, Some(killers), false)
    }

    /// 当前走子方的吃子走法（静态搜索使用）
    pub fn captures(state: &BoardState) -> Self {
        Self::build(state, 0, None, true)
    }

    fn build(
        state: &BoardState,
        depth: u32,
        killers: Option<&KillerTable>,
        captures_only: bool,
    ) -> Self {
        let board = &state.board;
        let side = state.side_to_move;

        let mut moves: Vec<ScoredMove> = MoveGenerator::generate_legal(board, side)
            .into_iter()
            .filter(|mv| !captures_only || mv.is_capture(board))
            .map(|mv| Self::tag_promotion(board, side, mv))
            .map(|mv| ScoredMove {
                mv,
                score: Self::score_move(state, mv, depth, killers),
            })
            .collect();

        // 稳定排序，同分保持生成顺序
        moves.sort_by(|a, b| b.score.cmp(&a.score));

        Self { moves, index: 0 }
    }

    /// 尚未取出的走法
    pub fn remaining(&self) -> &[ScoredMove] {
        &self.moves[self.index..]
    }

    /// 兵走到对方底线时标记为升变后
    fn tag_promotion(board: &Board, side: Color, mv: Move) -> Move {
        let is_pawn = board
            .get(mv.from)
            .is_some_and(|piece| piece.kind == PieceKind::Pawn);
        if is_pawn && mv.to.row == side.promotion_row() {
            Move::with_promotion(mv.from, mv.to, Promotion::Queen)
        } else {
            mv
        }
    }

    /// 走法打分（按优先级，命中即返回）
    ///
    /// 1. 吃子：`1000 + 10 × 被吃子价值 − 吃子方价值`
    /// 2. 本深度的杀手走法：900
    /// 3. 升变：800
    /// 4. 其余走法累加出子、中心兵、马到边、车小步、退回底线、落点被攻击等项，再加落点中局位置分
    pub fn score_move(
        state: &BoardState,
        mv: Move,
        depth: u32,
        killers: Option<&KillerTable>,
    ) -> i32 {
        let board = &state.board;
        let Some(attacker) = board.get(mv.from) else {
            return 0;
        };

        if let Some(victim) = board.get(mv.to) {
            return CAPTURE_BASE + 10 * victim.value() - attacker.value();
        }

        if killers.is_some_and(|k| k.contains(depth, mv)) {
            return KILLER_SCORE;
        }

        if mv.is_promotion() {
            return PROMOTION_SCORE;
        }

        let color = attacker.color;
        let from_rank = mv.from.relative_rank(color);
        let to_rank = mv.to.relative_rank(color);
        let mut score = 0;

        // 轻子离开底线
        if attacker.kind.is_minor() && from_rank == 0 {
            score += 100;
        }

        // 兵从起始行走到 d/e 线
        if attacker.kind == PieceKind::Pawn
            && mv.from.row == color.pawn_row()
            && (mv.to.col == 3 || mv.to.col == 4)
        {
            score += 120;
        }

        if attacker.kind == PieceKind::Knight && state.ply < 4 && mv.to.is_edge_file() {
            score -= 100;
        }

        if attacker.kind == PieceKind::Rook
            && mv.from.row.abs_diff(mv.to.row) + mv.from.col.abs_diff(mv.to.col) == 1
        {
            score -= 50;
        }

        // 轻子退回底线
        if attacker.kind.is_minor() && to_rank == 0 && (from_rank == 1 || from_rank == 2) {
            score -= 80;
        }

        if Self::would_be_captured(board, mv, color) {
            score -= 100;
        }

        score + Evaluator::midgame_square_value(attacker, mv.to)
    }

    /// 走完后落点是否被对方攻击
    fn would_be_captured(board: &Board, mv: Move, color: Color) -> bool {
        let mut scratch = board.clone();
        match scratch.make_move(mv) {
            Ok(_) => MoveGenerator::is_square_attacked(&scratch, mv.to, color.opponent()),
            Err(_) => false,
        }
    }
}

impl Iterator for MoveOrderer {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        let scored = self.moves.get(self.index)?;
        self.index += 1;
        Some(scored.mv)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.moves.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MoveOrderer {}
