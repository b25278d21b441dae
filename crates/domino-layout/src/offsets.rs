#![forbid(unsafe_code)]

//! Gaps and perpendicular shifts between adjacent nodes.
//!
//! Entries are keyed by the unordered node pair. A gap is only stored while
//! at least one side of the pair is detached.

use std::collections::BTreeMap;

use crate::node::NodeId;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Entry {
    offset: f32,
    /// Perpendicular displacement of the higher id relative to the lower.
    shift: f32,
}

fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Per-pair gap table of a block.
#[derive(Debug, Clone, Default)]
pub struct OffsetShifts {
    entries: BTreeMap<(NodeId, NodeId), Entry>,
}

impl OffsetShifts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gap between `a` and `b`, `0.0` if none is recorded.
    pub fn offset(&self, a: NodeId, b: NodeId) -> f32 {
        self.entries.get(&key(a, b)).map_or(0.0, |e| e.offset)
    }

    pub fn set_offset(&mut self, a: NodeId, b: NodeId, offset: f32) {
        self.entries.entry(key(a, b)).or_default().offset = offset;
    }

    /// How far `b` is moved against `a` perpendicular to their chain:
    /// `perp(b) = perp(a) - shift(a, b)`.
    pub fn shift(&self, a: NodeId, b: NodeId) -> f32 {
        let s = self.entries.get(&key(a, b)).map_or(0.0, |e| e.shift);
        if a <= b { s } else { -s }
    }

    pub fn set_shift(&mut self, a: NodeId, b: NodeId, shift: f32) {
        let s = if a <= b { shift } else { -shift };
        self.entries.entry(key(a, b)).or_default().shift = s;
    }

    /// Forget the pair entirely.
    pub fn remove(&mut self, a: NodeId, b: NodeId) {
        let _ = self.entries.remove(&key(a, b));
    }

    /// Forget every pair involving `node`.
    pub fn remove_node(&mut self, node: NodeId) {
        self.entries.retain(|&(a, b), _| a != node && b != node);
    }

    /// Pairs with a positive gap.
    pub fn gaps(&self) -> impl Iterator<Item = (NodeId, NodeId, f32)> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.offset > 0.0)
            .map(|(&(a, b), e)| (a, b, e.offset))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_symmetric() {
        let (a, b) = (NodeId::new(1), NodeId::new(2));
        let mut table = OffsetShifts::new();
        table.set_offset(b, a, 50.0);
        assert_eq!(table.offset(a, b), 50.0);
        assert_eq!(table.offset(b, a), 50.0);
        table.remove(a, b);
        assert_eq!(table.offset(a, b), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn shifts_flip_with_direction() {
        let (a, b) = (NodeId::new(1), NodeId::new(2));
        let mut table = OffsetShifts::new();
        table.set_shift(b, a, 3.0);
        assert_eq!(table.shift(b, a), 3.0);
        assert_eq!(table.shift(a, b), -3.0);
    }

    #[test]
    fn remove_node_drops_its_pairs() {
        let (a, b, c) = (NodeId::new(1), NodeId::new(2), NodeId::new(3));
        let mut table = OffsetShifts::new();
        table.set_offset(a, b, 1.0);
        table.set_offset(b, c, 2.0);
        table.remove_node(b);
        assert_eq!(table.gaps().count(), 0);
    }
}
