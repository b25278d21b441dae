#![forbid(unsafe_code)]

//! Orderings over the ids of one identifier space.

use std::cmp::Ordering;

use crate::id_type::{Id, IdType};

/// Ordering of ids within one identifier space.
///
/// Sorting a multi-typed collection applies a chain of comparators, each to
/// the column whose tag matches [`TypedComparator::id_type`].
pub trait TypedComparator {
    fn id_type(&self) -> &IdType;

    fn compare(&self, a: Id, b: Id) -> Ordering;
}

/// Ascending numeric order. Placeholders sort last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalOrder {
    id_type: IdType,
}

impl NaturalOrder {
    pub fn new(id_type: IdType) -> Self {
        Self { id_type }
    }
}

impl TypedComparator for NaturalOrder {
    fn id_type(&self) -> &IdType {
        &self.id_type
    }

    fn compare(&self, a: Id, b: Id) -> Ordering {
        a.cmp(&b)
    }
}
