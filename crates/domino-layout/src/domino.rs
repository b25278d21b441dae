#![forbid(unsafe_code)]

//! Owner of the whole node/block graph.
//!
//! [`Domino`] holds the node arena, every [`Block`], and the bands derived
//! between them. Each topology or sorting edit runs to completion and then
//! rebuilds the bands, carrying each band's granularity over by identifier.

use std::collections::BTreeMap;

use domino_core::logging::TARGET_BLOCK;
use domino_core::{Axis, Direction, Point};
use rustc_hash::FxHashMap;

use crate::band::Band;
use crate::block::{Block, BlockId};
use crate::config::DominoConfig;
use crate::error::{DominoError, Result};
use crate::linear_block::SortState;
use crate::node::{Node, NodeArena, NodeId, NodeSource};

#[derive(Debug, Default)]
pub struct Domino {
    config: DominoConfig,
    arena: NodeArena,
    blocks: BTreeMap<BlockId, Block>,
    placement: FxHashMap<NodeId, BlockId>,
    bands: Vec<Band>,
    next_block: u32,
}

impl Domino {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DominoConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DominoConfig {
        &self.config
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Register a dataset. The node is unplaced until added to a block.
    pub fn create_node(&mut self, source: impl NodeSource + 'static) -> NodeId {
        self.arena.insert(source)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn block_of(&self, node: NodeId) -> Option<BlockId> {
        self.placement.get(&node).copied()
    }

    fn unplaced(&self, node: NodeId) -> Result<()> {
        if !self.arena.contains(node) {
            return Err(DominoError::MissingNode { node });
        }
        match self.block_of(node) {
            Some(block) => Err(DominoError::NodeAlreadyPlaced { node, block }),
            None => Ok(()),
        }
    }

    fn placed(&self, node: NodeId) -> Result<BlockId> {
        self.block_of(node).ok_or(DominoError::MissingNode { node })
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block> {
        self.blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })
    }

    /// Start a new block at `location` holding just `node`.
    pub fn add_block(&mut self, node: NodeId, location: Point) -> Result<BlockId> {
        self.unplaced(node)?;
        self.next_block += 1;
        let id = BlockId::new(self.next_block);
        let mut block = Block::new(id, &mut self.arena, node, &self.config);
        block.set_location(location);
        let _ = self.blocks.insert(id, block);
        let _ = self.placement.insert(node, id);
        self.update_bands();
        Ok(id)
    }

    /// Place `node` next to `neighbor` in `block`.
    pub fn add_node(&mut self, block: BlockId, neighbor: NodeId, dir: Direction, node: NodeId) -> Result<()> {
        self.unplaced(node)?;
        let target = self
            .blocks
            .get_mut(&block)
            .ok_or(DominoError::MissingBlock { block })?;
        target.add_node(&mut self.arena, neighbor, dir, node, &self.config)?;
        let _ = self.placement.insert(node, block);
        self.update_bands();
        Ok(())
    }

    /// Take `node` out of its block, discarding the block if it empties.
    /// Returns the block the node was in and whether it was discarded.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(BlockId, bool)> {
        let id = self.placed(node)?;
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })?;
        let emptied = block.remove_node(&mut self.arena, node)?;
        let _ = self.placement.remove(&node);
        if emptied {
            let _ = self.blocks.remove(&id);
            domino_core::debug!(target: TARGET_BLOCK, block = %id, "block discarded");
        }
        self.update_bands();
        Ok((id, emptied))
    }

    /// Detach `node` from (or reattach it to) its neighbors.
    pub fn set_detached(&mut self, node: NodeId, detached: bool) -> Result<()> {
        let id = self.placed(node)?;
        let offset = if detached { self.config.detached_offset } else { 0.0 };
        let was = self.arena[node].is_detached();
        self.arena[node].set_detached_offset(offset);
        let is = self.arena[node].is_detached();
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })?;
        block.updated_node(&mut self.arena, node, was, is)?;
        self.update_bands();
        Ok(())
    }

    pub fn sort_by(&mut self, node: NodeId, data_axis: Axis) -> Result<SortState> {
        let id = self.placed(node)?;
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })?;
        let previous = block.sort_by(&mut self.arena, node, data_axis)?;
        self.update_bands();
        Ok(previous)
    }

    pub fn stratify_by(&mut self, node: NodeId, data_axis: Axis) -> Result<SortState> {
        let id = self.placed(node)?;
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })?;
        let previous = block.stratify_by(&mut self.arena, node, data_axis)?;
        self.update_bands();
        Ok(previous)
    }

    pub fn restore_sorting(&mut self, node: NodeId, data_axis: Axis, state: SortState) -> Result<SortState> {
        let id = self.placed(node)?;
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })?;
        let previous = block.restore_sorting(&mut self.arena, node, data_axis, state)?;
        self.update_bands();
        Ok(previous)
    }

    pub fn limit_to(&mut self, node: NodeId, data_axis: Axis) -> Result<Option<NodeId>> {
        let id = self.placed(node)?;
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(DominoError::MissingBlock { block: id })?;
        let previous = block.limit_to(&mut self.arena, node, data_axis)?;
        self.update_bands();
        Ok(previous)
    }

    pub fn zoom(&mut self, block: BlockId, factor: f32, just: Option<NodeId>) -> Result<()> {
        let target = self
            .blocks
            .get_mut(&block)
            .ok_or(DominoError::MissingBlock { block })?;
        target.zoom(&mut self.arena, factor, just, &self.config)?;
        self.update_bands();
        Ok(())
    }

    pub fn move_block(&mut self, block: BlockId, location: Point) -> Result<()> {
        self.block_mut(block)?.set_location(location);
        self.update_bands();
        Ok(())
    }

    /// Outline of `block` in absolute coordinates.
    pub fn outline(&self, block: BlockId) -> Result<Vec<Point>> {
        let target = self.block(block).ok_or(DominoError::MissingBlock { block })?;
        let origin = target.location();
        Ok(target
            .outline(&self.arena, &self.config)
            .into_iter()
            .map(|p| p.offset(origin.x, origin.y))
            .collect())
    }

    /// `true` if the blocks align at least one pair of compatible id types.
    pub fn can_have_bands(&self, a: BlockId, b: BlockId) -> bool {
        let (Some(a), Some(b)) = (self.blocks.get(&a), self.blocks.get(&b)) else {
            return false;
        };
        let theirs = b.id_types(&self.arena);
        a.id_types(&self.arena)
            .iter()
            .any(|t| theirs.iter().any(|u| t.is_compatible(u)))
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, identifier: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.identifier() == identifier)
    }

    pub fn band_mut(&mut self, identifier: &str) -> Option<&mut Band> {
        self.bands.iter_mut().find(|b| b.identifier() == identifier)
    }

    /// Rebuild bands between every pair of blocks plus each block's offset
    /// bands. Bands that survive keep their granularity.
    pub fn update_bands(&mut self) {
        let mut previous: FxHashMap<String, Band> = std::mem::take(&mut self.bands)
            .into_iter()
            .map(|b| (b.identifier().to_owned(), b))
            .collect();
        let blocks: Vec<&Block> = self.blocks.values().collect();
        let mut bands = Vec::new();
        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                bands.extend(a.create_bands_to(&self.arena, b));
            }
            bands.extend(a.create_offset_bands(&self.arena));
        }
        for band in &mut bands {
            if let Some(old) = previous.remove(band.identifier()) {
                band.init_from(&old);
            }
        }
        domino_core::trace!(
            target: TARGET_BLOCK,
            blocks = blocks.len(),
            bands = bands.len(),
            dropped = previous.len(),
            "bands rebuilt"
        );
        self.bands = bands;
    }
}
