#![forbid(unsafe_code)]

//! Chains of nodes sharing one axis.
//!
//! A [`LinearBlock`] laid out along `axis` aligns its members' identifiers
//! on the perpendicular *data axis*. It owns the authoritative ordering for
//! that axis and pushes each member its slice, regrouped, after every edit:
//!
//! 1. **update**: combine the members' sets (union, or the data selection
//!    expanded against the others) and stable-sort by the comparator chain
//!    of the sort criteria.
//! 2. **apply**: derive group boundaries from the first sort criterion (or
//!    one ungrouped range) and hand every member `slice(tag) + groups`.
//!
//! Structural preconditions (member exists, direction matches the axis) are
//! asserted; callers validate user input first.

use std::fmt::Write as _;

use domino_core::logging::TARGET_CHAIN;
use domino_core::{Axis, Direction, Point, Rect, Rgb};
use domino_typed::{
    GroupInfo, IdType, MultiTypedList, MultiTypedSet, TypedComparator, TypedGroup,
    TypedGroupList, TypedGroupSet, TypedSet,
};

use crate::node::{NodeArena, NodeId};
use crate::offsets::OffsetShifts;

/// Sort criteria and stratification of a chain, as returned by sorting
/// calls so an undo layer can restore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub criteria: Vec<NodeId>,
    pub stratified: bool,
}

/// Candidate drop position next to a chain end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub neighbor: NodeId,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct LinearBlock {
    axis: Axis,
    nodes: Vec<NodeId>,
    sort_criteria: Vec<NodeId>,
    stratified: bool,
    data_selection: Option<NodeId>,
    data: MultiTypedList,
}

impl LinearBlock {
    /// Single-node chain along `axis`. The node is the only sort criterion
    /// and the data selection.
    pub fn new(axis: Axis, node: NodeId, arena: &mut NodeArena, stratified: bool) -> Self {
        let mut block = Self {
            axis,
            nodes: vec![node],
            sort_criteria: vec![node],
            stratified,
            data_selection: Some(node),
            data: MultiTypedList::default(),
        };
        block.refresh(arena);
        block
    }

    /// Direction the chain extends in.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Axis whose identifiers the chain aligns.
    pub fn data_axis(&self) -> Axis {
        self.axis.opposite()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn sort_criteria(&self) -> &[NodeId] {
        &self.sort_criteria
    }

    pub fn is_stratified(&self) -> bool {
        self.stratified
    }

    /// `true` if `node` is the first criterion and the chain is stratified.
    pub fn is_stratified_by(&self, node: NodeId) -> bool {
        self.stratified && self.sort_criteria.first() == Some(&node)
    }

    pub fn data_selection(&self) -> Option<NodeId> {
        self.data_selection
    }

    /// The authoritative ordering.
    pub fn data(&self) -> &MultiTypedList {
        &self.data
    }

    pub fn sort_state(&self) -> SortState {
        SortState {
            criteria: self.sort_criteria.clone(),
            stratified: self.stratified,
        }
    }

    /// Tag of the first member's data.
    pub fn id_type<'a>(&self, arena: &'a NodeArena) -> Option<&'a IdType> {
        self.first().and_then(|n| arena[n].id_type(self.data_axis()))
    }

    /// Union of member bounds, relative to the block.
    pub fn bounds(&self, arena: &NodeArena) -> Option<Rect> {
        self.nodes
            .iter()
            .map(|&n| arena[n].bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Splice `node` next to `neighbor` on side `dir`. The new node becomes
    /// the lowest-priority sort criterion, and the data selection if there
    /// is none.
    ///
    /// # Panics
    ///
    /// Panics if `neighbor` is not a member or `dir` is not along the axis.
    pub fn add(&mut self, arena: &mut NodeArena, neighbor: NodeId, dir: Direction, node: NodeId) {
        assert_eq!(dir.axis(), self.axis, "direction {dir} is not along {}", self.axis);
        assert!(!self.contains(node), "node {node} is already in the chain");
        let index = match self.index_of(neighbor) {
            Some(index) => index,
            None => panic!("neighbor {neighbor} is not in the chain"),
        };

        let old = arena.neighbor(neighbor, dir);
        arena.link(neighbor, dir, Some(node));
        arena.link(node, dir, old);

        let at = if dir.is_primary() { index } else { index + 1 };
        self.nodes.insert(at, node);
        self.sort_criteria.push(node);
        if self.data_selection.is_none() {
            self.data_selection = Some(node);
        }
        self.refresh(arena);
    }

    /// Excise `node` and return its former index. Its slots along the axis
    /// are cleared; former neighbors are not linked to each other.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a member.
    pub fn remove(&mut self, arena: &mut NodeArena, node: NodeId) -> usize {
        let index = match self.index_of(node) {
            Some(index) => index,
            None => panic!("node {node} is not in the chain"),
        };
        let _ = self.nodes.remove(index);
        if arena.contains(node) {
            arena.unlink(node, self.axis.primary());
            arena.unlink(node, self.axis.primary().opposite());
        }
        self.sort_criteria.retain(|&n| n != node);
        if self.data_selection == Some(node) {
            self.data_selection = match self.nodes.as_slice() {
                [only] => Some(*only),
                _ => None,
            };
        }
        if self.sort_criteria.is_empty()
            && let Some(first) = self.first()
        {
            self.sort_criteria.push(first);
        }
        if !self.nodes.is_empty() {
            self.refresh(arena);
        }
        index
    }

    /// Toggle sorting by `node` and return the previous state.
    ///
    /// A single-node chain toggles stratification. Otherwise: if `node` is
    /// the first criterion and stratified, unstratify; if first and not
    /// stratified, stratify; else move it to the front and stratify. With
    /// `force_stratify` the result is always stratified by `node`.
    pub fn sort_by(&mut self, arena: &mut NodeArena, node: NodeId, force_stratify: bool) -> SortState {
        assert!(self.contains(node), "node {node} is not in the chain");
        let previous = self.sort_state();
        if self.nodes.len() == 1 {
            self.stratified = force_stratify || !self.stratified;
        } else if self.sort_criteria.first() == Some(&node) {
            self.stratified = force_stratify || !self.stratified;
        } else {
            self.sort_criteria.retain(|&n| n != node);
            self.sort_criteria.insert(0, node);
            self.stratified = true;
        }
        domino_core::debug!(
            target: TARGET_CHAIN,
            node = node.get(),
            stratified = self.stratified,
            criteria = self.sort_criteria.len(),
            "sort_by"
        );
        self.refresh(arena);
        previous
    }

    /// Replace criteria and stratification wholesale; returns the previous
    /// state.
    ///
    /// # Panics
    ///
    /// Panics if a criterion is not a member.
    pub fn sort_by_criteria(
        &mut self,
        arena: &mut NodeArena,
        criteria: Vec<NodeId>,
        stratified: bool,
    ) -> SortState {
        for &c in &criteria {
            assert!(self.contains(c), "criterion {c} is not in the chain");
        }
        let previous = self.sort_state();
        self.sort_criteria = criteria;
        if self.sort_criteria.is_empty()
            && let Some(first) = self.first()
        {
            self.sort_criteria.push(first);
        }
        self.stratified = stratified;
        self.refresh(arena);
        previous
    }

    /// Toggle limiting the ordering to `node`'s identifiers; returns the
    /// previous selection. No effect on a single-node chain.
    pub fn limit_data_to(&mut self, arena: &mut NodeArena, node: NodeId) -> Option<NodeId> {
        let previous = self.data_selection;
        if self.nodes.len() == 1 {
            return previous;
        }
        assert!(self.contains(node), "node {node} is not in the chain");
        self.data_selection = if previous == Some(node) {
            None
        } else {
            Some(node)
        };
        self.refresh(arena);
        previous
    }

    /// Recompute the ordering and push it to every member.
    pub fn refresh(&mut self, arena: &mut NodeArena) {
        self.update(arena);
        self.apply(arena);
    }

    /// Recompute the authoritative ordering.
    pub fn update(&mut self, arena: &NodeArena) {
        if self.nodes.is_empty() {
            return;
        }
        let span = domino_core::debug_span!(
            target: TARGET_CHAIN,
            "chain_update",
            axis = %self.axis,
            nodes = self.nodes.len()
        );
        let _guard = span.enter();

        let data_axis = self.data_axis();
        let sets: Vec<&TypedSet> = self
            .nodes
            .iter()
            .filter_map(|&n| arena[n].data(data_axis).map(TypedGroupSet::set))
            .collect();
        let selection = self.data_selection.and_then(|n| arena[n].data(data_axis));
        let combined = match selection {
            Some(selected) => MultiTypedSet::from_set(selected.set()).expand(sets.iter().copied()),
            None => MultiTypedSet::union_deep(sets.iter().copied()),
        };
        let comparators: Vec<&dyn TypedComparator> = self
            .sort_criteria
            .iter()
            .filter_map(|&n| arena[n].comparator(data_axis))
            .collect();
        self.data = combined.sort(&comparators);
        domino_core::trace!(
            target: TARGET_CHAIN,
            rows = self.data.len(),
            columns = self.data.id_types().len(),
            comparators = comparators.len(),
            limited = selection.is_some(),
            "ordering updated"
        );
    }

    /// Group boundaries of the current ordering as `(info, length)` runs.
    pub fn derived_groups(&self, arena: &NodeArena) -> Vec<(GroupInfo, usize)> {
        let rows = self.data.len();
        let leader = self.sort_criteria.first().copied();
        let grouping = leader.and_then(|n| arena[n].data(self.data_axis()));
        let Some(grouping) = grouping.filter(|_| self.stratified) else {
            return vec![(GroupInfo::ungrouped(), rows)];
        };
        if self.data_selection == leader {
            return grouping
                .groups()
                .iter()
                .map(|g| (g.info().clone(), g.len()))
                .collect();
        }

        let column = self.data.slice(grouping.id_type());
        let mut groups = Vec::with_capacity(grouping.group_count() + 1);
        let mut pos = 0;
        for group in grouping.groups() {
            let start = pos;
            while pos < rows && column.get(pos).is_some_and(|id| group.contains(id)) {
                pos += 1;
            }
            let consumed = pos - start;
            if consumed == 0 {
                continue;
            }
            let info = if consumed == group.len() {
                group.info().clone()
            } else {
                group.info().as_unmapped()
            };
            groups.push((info, consumed));
        }
        if pos < rows {
            groups.push((GroupInfo::unmapped(), rows - pos));
        }
        groups
    }

    /// Push each member its slice of the ordering with the derived groups.
    pub fn apply(&self, arena: &mut NodeArena) {
        if self.nodes.is_empty() {
            return;
        }
        let groups = self.derived_groups(arena);
        let data_axis = self.data_axis();
        let mut changed = 0usize;
        for &n in &self.nodes {
            let Some(tag) = arena[n].id_type(data_axis).cloned() else {
                continue;
            };
            let list = TypedGroupList::create(self.data.slice(&tag), groups.iter().cloned());
            if arena[n].set_data(data_axis, list) {
                changed += 1;
            }
        }
        domino_core::trace!(
            target: TARGET_CHAIN,
            groups = groups.len(),
            changed,
            "groups applied"
        );
    }

    /// Lay members out contiguously along the axis around `anchor`, which
    /// keeps its location. Gaps and perpendicular shifts come from
    /// `offsets`.
    pub fn align_along(&self, arena: &mut NodeArena, anchor: NodeId, offsets: &OffsetShifts) {
        let Some(index) = self.index_of(anchor) else {
            return;
        };
        let axis = self.axis;
        let perp = axis.opposite();
        for i in index + 1..self.nodes.len() {
            let (prev, cur) = (self.nodes[i - 1], self.nodes[i]);
            let at = arena[prev].location();
            let along = at.along(axis) + arena[prev].extent(axis) + offsets.offset(prev, cur);
            let across = at.along(perp) - offsets.shift(prev, cur);
            arena[cur].set_location(Point::ZERO.with(axis, along).with(perp, across));
        }
        for i in (0..index).rev() {
            let (next, cur) = (self.nodes[i + 1], self.nodes[i]);
            let at = arena[next].location();
            let along = at.along(axis) - arena[cur].extent(axis) - offsets.offset(cur, next);
            let across = at.along(perp) - offsets.shift(next, cur);
            arena[cur].set_location(Point::ZERO.with(axis, along).with(perp, across));
        }
    }

    /// Drop positions at either end for `node`, if its data is compatible.
    pub fn placeholders_for(&self, arena: &NodeArena, node: NodeId) -> Vec<Placeholder> {
        let data_axis = self.data_axis();
        let compatible = match (arena.get(node).and_then(|n| n.id_type(data_axis)), self.id_type(arena)) {
            (Some(theirs), Some(ours)) => theirs.is_compatible(ours),
            _ => false,
        };
        if !compatible {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(2);
        if let Some(first) = self.first().filter(|&n| n != node) {
            out.push(Placeholder {
                neighbor: first,
                direction: self.axis.primary(),
            });
        }
        if let Some(last) = self.last().filter(|&n| n != node) {
            out.push(Placeholder {
                neighbor: last,
                direction: self.axis.primary().opposite(),
            });
        }
        out
    }

    /// Indicator color for `node`: red when stratifying, magenta when a
    /// sort criterion, gray otherwise; darker when it limits the data.
    pub fn state_color(&self, node: NodeId) -> Rgb {
        let color = if self.is_stratified_by(node) {
            Rgb::RED
        } else if self.sort_criteria.contains(&node) {
            Rgb::MAGENTA
        } else {
            Rgb::GRAY
        };
        if self.data_selection == Some(node) {
            color.darker()
        } else {
            color
        }
    }

    /// Short description of `node`'s role, e.g. `"sorted (2), limited"`.
    pub fn state_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        if self.is_stratified_by(node) {
            out.push_str("stratified");
        } else if let Some(i) = self.sort_criteria.iter().position(|&n| n == node) {
            let _ = write!(out, "sorted ({})", i + 1);
        }
        if self.data_selection == Some(node) && self.nodes.len() > 1 {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str("limited");
        }
        out
    }
}
