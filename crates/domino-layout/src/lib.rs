#![forbid(unsafe_code)]

//! Alignment engine for tabular datasets.
//!
//! Nodes (datasets with identifiers per axis) are placed into blocks. Within
//! a block, every row or column of nodes forms a [`LinearBlock`] that owns
//! one authoritative ordering of the shared identifiers and pushes it back
//! onto its members, sliced and regrouped. Blocks derive their geometry and
//! outline from the neighbor grid, and [`Band`]s connect chains that share
//! identifiers at a selectable granularity.
//!
//! [`Domino`] owns the whole graph; all edits are synchronous and leave
//! neighbor slots, chain membership and bands consistent when they return.

pub mod band;
pub mod block;
pub mod config;
pub mod domino;
pub mod error;
pub mod linear_block;
pub mod node;
pub mod offsets;
pub mod outline;

pub use band::{Band, BandEnd, BandMode, BandRoute, Side};
pub use block::{Block, BlockId};
pub use config::DominoConfig;
pub use domino::Domino;
pub use error::{DominoError, Result};
pub use linear_block::{LinearBlock, Placeholder, SortState};
pub use node::{Node, NodeArena, NodeId, NodeSource, TableSource};
pub use offsets::OffsetShifts;
pub use outline::trace_outline;
