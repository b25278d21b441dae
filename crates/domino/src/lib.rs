#![forbid(unsafe_code)]

//! Domino public facade crate.
//!
//! Re-exports the identifier algebra and the alignment engine behind one
//! dependency, plus a prelude for day-to-day use.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use domino_core::{Axis, Direction, Point, Rect, Rgb, Size};

// --- Typed collection re-exports ---------------------------------------------

pub use domino_typed::{
    GroupInfo, GroupKind, GroupPartitionError, INVALID_ID, Id, IdCategory, IdType,
    MultiTypedError, MultiTypedList, MultiTypedSet, NaturalOrder, TypedComparator, TypedGroup,
    TypedGroupList, TypedGroupSet, TypedList, TypedSet, TypedSetGroup,
};

// --- Layout re-exports -----------------------------------------------------

pub use domino_layout::{
    Band, BandMode, BandRoute, Block, BlockId, Domino, DominoConfig, DominoError, LinearBlock,
    NodeId, NodeSource, SortState, TableSource,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A graph edit was rejected.
    Layout(DominoError),
    /// A grouped collection was built from an invalid partition.
    Partition(GroupPartitionError),
    /// Index-aligned components disagree on their row count.
    Components(MultiTypedError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Partition(err) => write!(f, "{err}"),
            Self::Components(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Partition(err) => Some(err),
            Self::Components(err) => Some(err),
        }
    }
}

impl From<DominoError> for Error {
    fn from(err: DominoError) -> Self {
        Self::Layout(err)
    }
}

impl From<GroupPartitionError> for Error {
    fn from(err: GroupPartitionError) -> Self {
        Self::Partition(err)
    }
}

impl From<MultiTypedError> for Error {
    fn from(err: MultiTypedError) -> Self {
        Self::Components(err)
    }
}

/// Standard result type for domino APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Axis, BandMode, Direction, Domino, DominoConfig, Error, IdCategory, IdType, NodeId, Point,
        Result, Rgb, TableSource, TypedGroupSet, TypedSet, TypedSetGroup,
    };

    pub use crate::{core, layout, typed};
}

pub use domino_core as core;
pub use domino_layout as layout;
pub use domino_typed as typed;
