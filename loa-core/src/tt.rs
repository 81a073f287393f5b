//! Transposition table for the alpha-beta search

use crate::board::Position;
use crate::eval::FORCED_WIN_THRESHOLD;
use rustc_hash::FxHashMap;

/// How a stored value relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Value is a lower bound (search failed high)
    Lower,
    /// Value is an upper bound (search failed low)
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub depth: u8,
    pub value: i32,
    pub bound: Bound,
    pub best: Option<(Position, Position)>,
}

/// Position table keyed by [`crate::Board::hash_for`], which mixes in the side to move
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn probe(&self, key: u64) -> Option<&TtEntry> {
        self.entries.get(&key)
    }

    /// Store an entry, keeping a deeper existing result for the same key
    pub fn store(&mut self, key: u64, entry: TtEntry) {
        match self.entries.get(&key) {
            Some(existing) if existing.depth > entry.depth => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }
}

/// Convert a root-relative win score into a node-relative one for storage
pub fn value_to_tt(value: i32, ply: u32) -> i32 {
    if value >= FORCED_WIN_THRESHOLD {
        value + ply as i32
    } else if value <= -FORCED_WIN_THRESHOLD {
        value - ply as i32
    } else {
        value
    }
}

/// Inverse of [`value_to_tt`]
pub fn value_from_tt(value: i32, ply: u32) -> i32 {
    if value >= FORCED_WIN_THRESHOLD {
        value - ply as i32
    } else if value <= -FORCED_WIN_THRESHOLD {
        value + ply as i32
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::WIN_VALUE;

    fn entry(depth: u8, value: i32) -> TtEntry {
        TtEntry {
            depth,
            value,
            bound: Bound::Exact,
            best: None,
        }
    }

    #[test]
    fn test_store_keeps_deeper_entry() {
        let mut tt = TranspositionTable::new();
        tt.store(7, entry(3, 10));
        tt.store(7, entry(1, 99));
        assert_eq!(tt.probe(7).map(|e| e.value), Some(10));
        tt.store(7, entry(3, 20));
        assert_eq!(tt.probe(7).map(|e| e.value), Some(20));
        assert_eq!(tt.len(), 1);
        tt.clear();
        assert!(tt.is_empty());
    }

    #[test]
    fn test_win_scores_are_ply_relative() {
        let root_relative = WIN_VALUE - 5;
        let stored = value_to_tt(root_relative, 3);
        assert_eq!(stored, WIN_VALUE - 2);
        assert_eq!(value_from_tt(stored, 3), root_relative);
        assert_eq!(value_from_tt(stored, 1), WIN_VALUE - 3);
        assert_eq!(value_to_tt(42, 9), 42);
        assert_eq!(value_from_tt(-(WIN_VALUE - 2), 2), -(WIN_VALUE - 4));
    }
}
