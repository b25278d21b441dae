#![forbid(unsafe_code)]

//! Connected groups of nodes and the chains covering them.
//!
//! A [`Block`] owns the [`LinearBlock`]s of its nodes (at most one per node
//! and axis), the gap table between adjacent nodes, and the block's own
//! placement. Node locations are relative to the block; after every edit
//! the block is realigned outward from a fixed node and shifted so the
//! top-left node sits at the block origin.
//!
//! Public operations that take a node and an axis take the node's *data*
//! axis, i.e. the axis whose identifiers are being sorted or limited. The
//! chain consulted is the one running along the opposite axis.

use std::collections::VecDeque;
use std::fmt;

use domino_core::logging::TARGET_BLOCK;
use domino_core::{Axis, Direction, Point, Rect, Rgb, Size};
use domino_typed::IdType;
use smallvec::SmallVec;

use crate::band::{Band, BandEnd};
use crate::config::DominoConfig;
use crate::error::{DominoError, Result};
use crate::linear_block::{LinearBlock, Placeholder, SortState};
use crate::node::{NodeArena, NodeId};
use crate::offsets::OffsetShifts;
use crate::outline::trace_outline;

/// Stable identifier of a block within a [`crate::Domino`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(u32);

impl BlockId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    nodes: Vec<NodeId>,
    chains: Vec<LinearBlock>,
    offsets: OffsetShifts,
    location: Point,
    size: Size,
}

impl Block {
    /// Block holding just `node`, with one chain per axis the node has
    /// data for.
    pub fn new(id: BlockId, arena: &mut NodeArena, node: NodeId, config: &DominoConfig) -> Self {
        arena.reset(node);
        let mut block = Self {
            id,
            nodes: vec![node],
            chains: Vec::with_capacity(2),
            offsets: OffsetShifts::new(),
            location: Point::ZERO,
            size: Size::ZERO,
        };
        for axis in Axis::ALL {
            if arena[node].has(axis.opposite()) {
                block.push_chain(arena, axis, node, config);
            }
        }
        block.size = arena[node].size();
        domino_core::debug!(
            target: TARGET_BLOCK,
            block = %id,
            node = %node,
            chains = block.chains.len(),
            "block created"
        );
        block
    }

    fn push_chain(&mut self, arena: &mut NodeArena, axis: Axis, node: NodeId, config: &DominoConfig) {
        let mut chain = LinearBlock::new(axis, node, arena, config.stratify_new_chains);
        let grouped = arena[node]
            .data(chain.data_axis())
            .is_some_and(|data| data.group_count() > 1);
        if config.auto_stratify && grouped && !chain.is_stratified_by(node) {
            let _ = chain.sort_by(arena, node, true);
        }
        self.chains.push(chain);
    }

    pub fn id(&self) -> BlockId {
        self.id
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

    pub fn chains(&self) -> &[LinearBlock] {
        &self.chains
    }

    pub fn offsets(&self) -> &OffsetShifts {
        &self.offsets
    }

    /// Placement of the block origin.
    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        self.location = location;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Absolute bounds of the block.
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.location, self.size)
    }

    fn chain_index(&self, node: NodeId, axis: Axis) -> Option<usize> {
        self.chains
            .iter()
            .position(|c| c.axis() == axis && c.contains(node))
    }

    /// Chains `node` is a member of.
    fn chains_of(&self, node: NodeId) -> SmallVec<[usize; 2]> {
        self.chains
            .iter()
            .enumerate()
            .filter(|(_, c)| c.contains(node))
            .map(|(i, _)| i)
            .collect()
    }

    /// The chain running along `axis` through `node`.
    pub fn chain(&self, node: NodeId, axis: Axis) -> Option<&LinearBlock> {
        self.chain_index(node, axis).map(|i| &self.chains[i])
    }

    fn chain_for_data(&self, node: NodeId, data_axis: Axis) -> Result<usize> {
        if !self.contains(node) {
            return Err(DominoError::MissingNode { node });
        }
        let axis = data_axis.opposite();
        self.chain_index(node, axis)
            .ok_or(DominoError::NoChain { node, axis })
    }

    /// Place `node` next to `neighbor` on side `dir`.
    ///
    /// The node joins `neighbor`'s chain along `dir`, and the perpendicular
    /// chain of a grid cell it completes (or a new one). The caller ensures
    /// `node` is not placed in any block.
    pub fn add_node(
        &mut self,
        arena: &mut NodeArena,
        neighbor: NodeId,
        dir: Direction,
        node: NodeId,
        config: &DominoConfig,
    ) -> Result<()> {
        if !self.contains(neighbor) {
            return Err(DominoError::MissingNode { node: neighbor });
        }
        if !arena.contains(node) {
            return Err(DominoError::MissingNode { node });
        }
        let axis = dir.axis();
        let data_axis = axis.opposite();
        let Some(ci) = self.chain_index(neighbor, axis) else {
            return Err(DominoError::NoChain {
                node: neighbor,
                axis,
            });
        };
        if !arena[node].has(data_axis) {
            return Err(DominoError::NoChain { node, axis });
        }
        if let (Some(ours), Some(theirs)) =
            (self.chains[ci].id_type(arena), arena[node].id_type(data_axis))
            && !theirs.is_compatible(ours)
        {
            return Err(DominoError::IncompatibleData {
                node,
                axis: data_axis,
            });
        }
        if let Some(occupant) = arena.neighbor(neighbor, dir) {
            let side = dir.rot90();
            if arena.neighbor(occupant, side).is_some()
                || arena.neighbor(occupant, side.opposite()).is_some()
            {
                return Err(DominoError::NeighborOccupied { neighbor, occupant });
            }
        }

        let span = domino_core::debug_span!(
            target: TARGET_BLOCK,
            "block_add_node",
            block = %self.id,
            node = %node,
            neighbor = %neighbor,
            dir = %dir
        );
        let _guard = span.enter();

        arena.reset(node);
        let scale = arena[neighbor].scale(data_axis);
        arena[node].set_scale(data_axis, scale);
        self.chains[ci].add(arena, neighbor, dir, node);
        self.nodes.push(node);

        if arena[node].has(axis) {
            self.link_across(arena, neighbor, dir, node, config);
        }
        self.update_offsets(arena, node);
        self.realign(arena, neighbor);
        domino_core::trace!(
            target: TARGET_BLOCK,
            nodes = self.nodes.len(),
            chains = self.chains.len(),
            "node added"
        );
        Ok(())
    }

    /// Join the perpendicular chains of grid cells next to the newly placed
    /// `node`, merging them when it bridges two; otherwise start a new one.
    fn link_across(
        &mut self,
        arena: &mut NodeArena,
        neighbor: NodeId,
        dir: Direction,
        node: NodeId,
        config: &DominoConfig,
    ) {
        let cross = dir.axis().opposite();
        let mut joined: Option<usize> = None;
        for side in [dir.rot90(), dir.rot90().opposite()] {
            let Some(cell) = arena
                .neighbor(neighbor, side)
                .and_then(|n| arena.neighbor(n, dir))
                .filter(|&c| c != node)
            else {
                continue;
            };
            if arena.neighbor(cell, side.opposite()).is_some() {
                continue;
            }
            let Some(ci) = self.chain_index(cell, cross) else {
                continue;
            };
            let compatible = match (self.chains[ci].id_type(arena), arena[node].id_type(dir.axis())) {
                (Some(ours), Some(theirs)) => theirs.is_compatible(ours),
                _ => false,
            };
            if !compatible {
                continue;
            }
            match joined {
                None => {
                    self.chains[ci].add(arena, cell, side.opposite(), node);
                    joined = Some(ci);
                }
                Some(into) if into != ci => {
                    self.merge_chain(arena, into, ci, node, side);
                    joined = self.chain_index(node, cross);
                }
                Some(_) => {}
            }
        }
        if joined.is_none() {
            self.push_chain(arena, cross, node, config);
        }
    }

    /// Move every member of chain `from` into chain `into`, continuing past
    /// `node` in direction `side`. Drops the emptied chain.
    fn merge_chain(&mut self, arena: &mut NodeArena, into: usize, from: usize, node: NodeId, side: Direction) {
        let mut members = self.chains[from].nodes().to_vec();
        if side.is_primary() {
            members.reverse();
        }
        let mut prev = node;
        for member in members {
            let _ = self.chains[from].remove(arena, member);
            self.chains[into].add(arena, prev, side, member);
            prev = member;
        }
        let _ = self.chains.remove(from);
        domino_core::debug!(target: TARGET_BLOCK, block = %self.id, "merged chains");
    }

    /// Remove `node` and re-link its former neighbors along each chain.
    /// Returns `true` if the block is now empty.
    pub fn remove_node(&mut self, arena: &mut NodeArena, node: NodeId) -> Result<bool> {
        if !self.contains(node) {
            return Err(DominoError::MissingNode { node });
        }
        let span = domino_core::debug_span!(
            target: TARGET_BLOCK,
            "block_remove_node",
            block = %self.id,
            node = %node
        );
        let _guard = span.enter();

        let mut anchor = None;
        for axis in Axis::ALL {
            let Some(ci) = self.chain_index(node, axis) else {
                continue;
            };
            let dir = axis.primary();
            let before = arena.neighbor(node, dir);
            let after = arena.neighbor(node, dir.opposite());
            let shift = match (before, after) {
                (Some(b), Some(a)) => self.offsets.shift(b, node) + self.offsets.shift(node, a),
                _ => 0.0,
            };
            let _ = self.chains[ci].remove(arena, node);
            if let (Some(b), Some(a)) = (before, after) {
                arena.link(b, dir.opposite(), Some(a));
                let gap = arena[b].detached_offset().max(arena[a].detached_offset());
                if gap > 0.0 {
                    self.offsets.set_offset(b, a, gap);
                }
                if shift != 0.0 {
                    self.offsets.set_shift(b, a, shift);
                }
            }
            anchor = anchor.or(before).or(after);
        }
        for dir in Direction::ALL {
            if let Some(n) = arena.neighbor(node, dir) {
                anchor = anchor.or(Some(n));
            }
            arena.unlink(node, dir);
        }
        self.offsets.remove_node(node);
        self.nodes.retain(|&n| n != node);
        self.chains.retain(|c| !c.is_empty());

        if self.nodes.is_empty() {
            domino_core::debug!(target: TARGET_BLOCK, block = %self.id, "block emptied");
            return Ok(true);
        }
        let start = anchor.unwrap_or(self.nodes[0]);
        self.realign(arena, start);
        Ok(false)
    }

    /// Recompute the gaps between `node` and its neighbors from their
    /// detachment amounts.
    fn update_offsets(&mut self, arena: &NodeArena, node: NodeId) {
        let own = arena[node].detached_offset();
        for (_, n) in arena[node].neighbors() {
            let gap = own.max(arena[n].detached_offset());
            self.offsets.set_offset(node, n, gap);
        }
    }

    /// `node` changed size, data, or detachment. Refresh its gaps and
    /// re-layout the block.
    pub fn updated_node(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        was_detached: bool,
        is_detached: bool,
    ) -> Result<()> {
        if !self.contains(node) {
            return Err(DominoError::MissingNode { node });
        }
        if was_detached != is_detached {
            self.update_offsets(arena, node);
        }
        self.realign(arena, node);
        Ok(())
    }

    /// Lay out every chain outward from `start` (which keeps its location),
    /// then move the block origin to the top-left node.
    fn realign(&mut self, arena: &mut NodeArena, start: NodeId) {
        let mut chain_done = vec![false; self.chains.len()];
        let mut seen: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        for root in std::iter::once(start).chain(self.nodes.clone()) {
            if seen.contains(&root) {
                continue;
            }
            seen.push(root);
            queue.push_back(root);
            while let Some(n) = queue.pop_front() {
                for ci in self.chains_of(n) {
                    if chain_done[ci] {
                        continue;
                    }
                    chain_done[ci] = true;
                    let chain = &self.chains[ci];
                    chain.align_along(arena, n, &self.offsets);
                    for &m in chain.nodes() {
                        if !seen.contains(&m) {
                            seen.push(m);
                            queue.push_back(m);
                        }
                    }
                }
            }
        }
        self.shift_to_zero(arena);
    }

    fn shift_to_zero(&mut self, arena: &mut NodeArena) {
        let Some(bounds) = self
            .nodes
            .iter()
            .map(|&n| arena[n].bounds())
            .reduce(|a, b| a.union(&b))
        else {
            self.size = Size::ZERO;
            return;
        };
        let (dx, dy) = (bounds.x, bounds.y);
        if dx != 0.0 || dy != 0.0 {
            for &n in &self.nodes {
                let at = arena[n].location();
                arena[n].set_location(at.offset(-dx, -dy));
            }
            self.location = self.location.offset(dx, dy);
        }
        self.size = bounds.size();
    }

    /// Toggle sorting `node`'s chain by it; returns the previous state.
    pub fn sort_by(&mut self, arena: &mut NodeArena, node: NodeId, data_axis: Axis) -> Result<SortState> {
        let ci = self.chain_for_data(node, data_axis)?;
        let previous = self.chains[ci].sort_by(arena, node, false);
        self.realign(arena, node);
        Ok(previous)
    }

    /// Sort and stratify by `node` regardless of the current state.
    pub fn stratify_by(&mut self, arena: &mut NodeArena, node: NodeId, data_axis: Axis) -> Result<SortState> {
        let ci = self.chain_for_data(node, data_axis)?;
        let previous = self.chains[ci].sort_by(arena, node, true);
        self.realign(arena, node);
        Ok(previous)
    }

    /// Reinstate a state returned by a sorting call.
    pub fn restore_sorting(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        data_axis: Axis,
        state: SortState,
    ) -> Result<SortState> {
        let ci = self.chain_for_data(node, data_axis)?;
        if let Some(&missing) = state.criteria.iter().find(|&&c| !self.chains[ci].contains(c)) {
            return Err(DominoError::MissingNode { node: missing });
        }
        let previous = self.chains[ci].sort_by_criteria(arena, state.criteria, state.stratified);
        self.realign(arena, node);
        Ok(previous)
    }

    /// Toggle limiting `node`'s chain to its ids; returns the previous
    /// selection.
    pub fn limit_to(&mut self, arena: &mut NodeArena, node: NodeId, data_axis: Axis) -> Result<Option<NodeId>> {
        let ci = self.chain_for_data(node, data_axis)?;
        let previous = self.chains[ci].limit_data_to(arena, node);
        self.realign(arena, node);
        Ok(previous)
    }

    /// Recompute every chain, e.g. after source data changed.
    pub fn resort(&mut self, arena: &mut NodeArena) {
        for chain in &mut self.chains {
            chain.refresh(arena);
        }
        if let Some(&first) = self.nodes.first() {
            self.realign(arena, first);
        }
    }

    /// White when `node` has no chain for `data_axis`.
    pub fn state_color(&self, node: NodeId, data_axis: Axis) -> Rgb {
        self.chain(node, data_axis.opposite())
            .map_or(Rgb::WHITE, |c| c.state_color(node))
    }

    pub fn state_string(&self, node: NodeId, data_axis: Axis) -> String {
        self.chain(node, data_axis.opposite())
            .map(|c| c.state_string(node))
            .unwrap_or_default()
    }

    /// Resize `just` (or every node) by `factor` and carry the new scale
    /// along each affected chain's data axis.
    pub fn zoom(&mut self, arena: &mut NodeArena, factor: f32, just: Option<NodeId>, config: &DominoConfig) -> Result<()> {
        let targets: Vec<NodeId> = match just {
            Some(node) if !self.contains(node) => return Err(DominoError::MissingNode { node }),
            Some(node) => vec![node],
            None => self.nodes.clone(),
        };
        for &n in &targets {
            arena[n].zoom(factor, config.min_node_extent);
        }
        for &n in &targets {
            for ci in self.chains_of(n) {
                let chain = &self.chains[ci];
                let data_axis = chain.data_axis();
                let scale = arena[n].scale(data_axis);
                for &m in chain.nodes() {
                    arena[m].set_scale(data_axis, scale);
                }
            }
        }
        let start = targets.first().copied().or(self.nodes.first().copied());
        if let Some(start) = start {
            self.realign(arena, start);
        }
        Ok(())
    }

    /// Clockwise outline in block coordinates, starting at the top-right
    /// corner of the top-left node.
    pub fn outline(&self, arena: &NodeArena, config: &DominoConfig) -> Vec<Point> {
        let clockwise = |r: Rect| {
            [Direction::East, Direction::South, Direction::West, Direction::North].map(|d| r.corner(d))
        };
        match self.nodes.as_slice() {
            [] => Vec::new(),
            [only] => clockwise(arena[*only].bounds()).to_vec(),
            nodes => {
                let single = self
                    .chains
                    .iter()
                    .find(|c| c.len() == nodes.len())
                    .and_then(|c| c.bounds(arena));
                match single {
                    Some(bounds) => clockwise(bounds).to_vec(),
                    None => trace_outline(arena, nodes[0], config.outline_step_limit(nodes.len())),
                }
            }
        }
    }

    /// Nodes whose absolute bounds overlap `region`.
    pub fn select_by_bounds(&self, arena: &NodeArena, region: &Rect) -> Vec<NodeId> {
        self.nodes
            .iter()
            .copied()
            .filter(|&n| self.absolute_bounds(arena, n).intersects(region))
            .collect()
    }

    fn absolute_bounds(&self, arena: &NodeArena, node: NodeId) -> Rect {
        arena[node].bounds().translated(self.location.x, self.location.y)
    }

    /// Distinct id types aligned by this block's chains.
    pub fn id_types(&self, arena: &NodeArena) -> Vec<IdType> {
        let mut out: Vec<IdType> = Vec::new();
        for chain in &self.chains {
            for &n in chain.nodes() {
                if let Some(tag) = arena[n].id_type(chain.data_axis())
                    && !out.contains(tag)
                {
                    out.push(tag.clone());
                }
            }
        }
        out
    }

    /// Node labels joined by `", "`.
    pub fn label(&self, arena: &NodeArena) -> String {
        self.nodes
            .iter()
            .map(|&n| arena[n].label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Drop positions for `node` at the ends of every chain.
    pub fn placeholders_for(&self, arena: &NodeArena, node: NodeId) -> Vec<Placeholder> {
        self.chains
            .iter()
            .flat_map(|c| c.placeholders_for(arena, node))
            .filter(|p| arena.neighbor(p.neighbor, p.direction).is_none())
            .collect()
    }

    fn band_end(&self, arena: &NodeArena, chain: &LinearBlock, node: NodeId, bounds: Rect) -> Option<BandEnd> {
        let data_axis = chain.data_axis();
        let data = arena[node].displayed(data_axis)?.clone();
        Some(BandEnd {
            node,
            label: arena[node].label().to_owned(),
            data,
            bounds: bounds.translated(self.location.x, self.location.y),
            axis: data_axis,
            detail: arena[node].supports_detail(data_axis),
        })
    }

    /// Bands from every chain of this block to every compatible chain of
    /// `other`.
    pub fn create_bands_to(&self, arena: &NodeArena, other: &Block) -> Vec<Band> {
        let mut bands = Vec::new();
        for la in &self.chains {
            for lb in &other.chains {
                let compatible = match (la.id_type(arena), lb.id_type(arena)) {
                    (Some(a), Some(b)) => a.is_compatible(b),
                    _ => false,
                };
                if !compatible {
                    continue;
                }
                let (Some(s), Some(t), Some(sb), Some(tb)) =
                    (la.first(), lb.last(), la.bounds(arena), lb.bounds(arena))
                else {
                    continue;
                };
                let (Some(source), Some(target)) = (
                    self.band_end(arena, la, s, sb),
                    other.band_end(arena, lb, t, tb),
                ) else {
                    continue;
                };
                let identifier = format!("{}X{}", s.get().min(t.get()), s.get().max(t.get()));
                bands.extend(Band::create(identifier, source, target));
            }
        }
        bands
    }

    /// Micro-bands across the gap of every detached adjacent pair.
    pub fn create_offset_bands(&self, arena: &NodeArena) -> Vec<Band> {
        let mut bands = Vec::new();
        for (a, b, _) in self.offsets.gaps() {
            let Some(chain) = self.chains.iter().find(|c| c.contains(a) && c.contains(b)) else {
                continue;
            };
            let (s, t) = match (chain.index_of(a), chain.index_of(b)) {
                (Some(i), Some(j)) if i <= j => (a, b),
                _ => (b, a),
            };
            let (Some(source), Some(target)) = (
                self.band_end(arena, chain, s, arena[s].bounds()),
                self.band_end(arena, chain, t, arena[t].bounds()),
            ) else {
                continue;
            };
            bands.extend(Band::create(format!("{}D{}", s.get(), t.get()), source, target));
        }
        bands
    }
}
