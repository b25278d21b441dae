#![forbid(unsafe_code)]

//! Failures of topology edits requested with caller-supplied ids.

use std::fmt;

use domino_core::Axis;

use crate::block::BlockId;
use crate::node::NodeId;

/// Structured reasons a [`crate::Domino`] or [`crate::Block`] operation was
/// rejected. The graph is left unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DominoError {
    MissingNode {
        node: NodeId,
    },
    MissingBlock {
        block: BlockId,
    },
    /// Node is already part of a block.
    NodeAlreadyPlaced {
        node: NodeId,
        block: BlockId,
    },
    /// Node has no chain along `axis`, or has no data to join one.
    NoChain {
        node: NodeId,
        axis: Axis,
    },
    /// Splicing next to `neighbor` would tear a grid row or column.
    NeighborOccupied {
        neighbor: NodeId,
        occupant: NodeId,
    },
    /// Node's data along `axis` is keyed in an identifier space the chain
    /// cannot align with.
    IncompatibleData {
        node: NodeId,
        axis: Axis,
    },
}

impl fmt::Display for DominoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode { node } => write!(f, "node {node} not found"),
            Self::MissingBlock { block } => write!(f, "block {block} not found"),
            Self::NodeAlreadyPlaced { node, block } => {
                write!(f, "node {node} is already placed in block {block}")
            }
            Self::NoChain { node, axis } => {
                write!(f, "node {node} has no {axis} chain")
            }
            Self::NeighborOccupied { neighbor, occupant } => write!(
                f,
                "cannot splice next to node {neighbor}: node {occupant} is part of a grid"
            ),
            Self::IncompatibleData { node, axis } => {
                write!(f, "node {node} has {axis} data incompatible with the chain")
            }
        }
    }
}

impl std::error::Error for DominoError {}

/// Result alias for layout operations.
pub type Result<T> = std::result::Result<T, DominoError>;
