#![forbid(unsafe_code)]

//! Typed identifier collections.
//!
//! Raw integer identifiers only mean something together with the identifier
//! space they come from. This crate keeps the two together:
//!
//! - [`IdType`] - identifier-space tag with a category for compatibility
//! - [`TypedSet`] / [`TypedList`] - tagged set and ordered list of ids
//! - [`MultiTypedSet`] / [`MultiTypedList`] - index-aligned tuples of tagged
//!   columns, one row per logical entity
//! - [`TypedGroupSet`] / [`TypedGroupList`] - collections partitioned into
//!   labeled, colored groups
//! - [`TypedComparator`] - per-identifier-space orderings used for sorting
//!
//! Operations between incompatible identifier spaces never fail; they
//! degrade to empty (or neutral) results.

pub mod compare;
pub mod error;
pub mod group;
pub mod id_type;
pub mod list;
pub mod multi;
pub mod set;

pub use compare::{NaturalOrder, TypedComparator};
pub use error::{GroupPartitionError, MultiTypedError};
pub use group::{
    GroupInfo, GroupKind, TypedGroup, TypedGroupList, TypedGroupSet, TypedListGroup, TypedSetGroup,
};
pub use id_type::{INVALID_ID, Id, IdCategory, IdType};
pub use list::TypedList;
pub use multi::{MultiTypedList, MultiTypedSet, Row};
pub use set::TypedSet;
