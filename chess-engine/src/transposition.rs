//! 置换表
//!
//! 用于缓存已搜索过的局面，避免重复计算

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 置换表条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// 精确值
    Exact,
    /// 下界（Beta 截断）
    LowerBound,
    /// 上界（Alpha 截断）
    UpperBound,
}

/// 置换表条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// 搜索深度
    pub depth: u32,
    /// 评估分数（存入时走子方视角）
    pub score: i32,
    /// 条目类型
    pub entry_type: EntryType,
}

/// 置换表
///
/// 以局面指纹为键，不限大小。同一键只在新深度不小于已存深度时覆盖，
/// 不区分条目类型。
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    /// 命中次数
    hits: AtomicU64,
    /// 查询次数
    probes: AtomicU64,
}

impl TranspositionTable {
    /// 创建空置换表
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询条目
    pub fn retrieve(&self, hash: u64) -> Option<&TTEntry> {
        self.probes.fetch_add(1, Ordering::Relaxed);

        let entry = self.entries.get(&hash);
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// 搜索时查询：只返回深度不小于 `depth` 的条目，计入查询和命中统计
    pub fn probe(&self, hash: u64, depth: u32) -> Option<&TTEntry> {
        self.probes.fetch_add(1, Ordering::Relaxed);

        if !self.contains(hash, depth) {
            return None;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.entries.get(&hash)
    }

    /// 是否存在深度不小于 `depth` 的条目
    pub fn contains(&self, hash: u64, depth: u32) -> bool {
        self.entries
            .get(&hash)
            .is_some_and(|entry| entry.depth >= depth)
    }

    /// 存储条目
    pub fn store(&mut self, hash: u64, depth: u32, score: i32, entry_type: EntryType) {
        let entry = TTEntry {
            depth,
            score,
            entry_type,
        };

        // 替换策略：空槽直接写入，否则新条目深度不小于旧条目时替换
        self.entries
            .entry(hash)
            .and_modify(|existing| {
                if depth >= existing.depth {
                    *existing = entry;
                }
            })
            .or_insert(entry);
    }

    /// 清空表
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.probes.store(0, Ordering::Relaxed);
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 遍历所有条目
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &TTEntry)> {
        self.entries.iter()
    }

    /// 获取命中率
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    /// 获取统计信息
    pub fn stats(&self) -> TTStats {
        TTStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
        }
    }
}

/// 置换表统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TTStats {
    pub entries: usize,
    pub hits: u64,
    pub probes: u64,
}

impl TTStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tt_store_and_retrieve() {
        let mut tt = TranspositionTable::new();

        let hash = 0x1234567890ABCDEF_u64;
        tt.store(hash, 5, 100, EntryType::Exact);

        let entry = tt.retrieve(hash).unwrap();
        assert_eq!(
            *entry,
            TTEntry {
                depth: 5,
                score: 100,
                entry_type: EntryType::Exact
            }
        );
    }

    #[test]
    fn test_tt_miss() {
        let tt = TranspositionTable::new();

        assert!(tt.retrieve(0x1234567890ABCDEF).is_none());
        assert!(!tt.contains(0x1234567890ABCDEF, 0));
        assert_eq!(
            tt.stats(),
            TTStats {
                entries: 0,
                hits: 0,
                probes: 1
            }
        );
    }

    #[test]
    fn test_tt_replacement() {
        let mut tt = TranspositionTable::new();
        let hash = 0x1234567890ABCDEF_u64;

        tt.store(hash, 3, 50, EntryType::Exact);
        // 更深的条目替换
        tt.store(hash, 5, 100, EntryType::LowerBound);
        assert_eq!(tt.retrieve(hash).unwrap().score, 100);

        // 更浅的条目被忽略
        tt.store(hash, 4, -20, EntryType::Exact);
        let entry = tt.retrieve(hash).unwrap();
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.score, 100);

        // 同深度覆盖，不看条目类型
        tt.store(hash, 5, 7, EntryType::UpperBound);
        let entry = tt.retrieve(hash).unwrap();
        assert_eq!(entry.score, 7);
        assert_eq!(entry.entry_type, EntryType::UpperBound);
    }

    #[test]
    fn test_tt_contains_depth() {
        let mut tt = TranspositionTable::new();
        tt.store(42, 3, 0, EntryType::Exact);

        assert!(tt.contains(42, 0));
        assert!(tt.contains(42, 3));
        assert!(!tt.contains(42, 4));
    }

    #[test]
    fn test_tt_probe_counts_shallow_entry_as_miss() {
        let mut tt = TranspositionTable::new();
        tt.store(42, 2, 15, EntryType::Exact);

        assert_eq!(tt.probe(42, 2).map(|e| e.score), Some(15));
        assert!(tt.probe(42, 3).is_none());
        assert!(tt.probe(7, 0).is_none());
        assert_eq!(
            tt.stats(),
            TTStats {
                entries: 1,
                hits: 1,
                probes: 3
            }
        );
    }

    #[test]
    fn test_tt_clear_and_stats() {
        let mut tt = TranspositionTable::new();
        tt.store(1, 1, 10, EntryType::Exact);
        tt.store(2, 1, 20, EntryType::Exact);
        tt.retrieve(1);
        tt.retrieve(3);

        assert_eq!(tt.len(), 2);
        assert!((tt.hit_rate() - 0.5).abs() < f64::EPSILON);

        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.stats().probes, 0);
        assert_eq!(tt.iter().count(), 0);
    }
}
