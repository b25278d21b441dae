#![forbid(unsafe_code)]

//! Ordered tagged id lists.

use std::ops::Range;
use std::sync::Arc;

use crate::id_type::{INVALID_ID, Id, IdType};
use crate::set::TypedSet;

/// Ordered sequence of ids from one identifier space. Duplicates and
/// [`INVALID_ID`] placeholders are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedList {
    ids: Arc<[Id]>,
    id_type: IdType,
}

impl TypedList {
    pub fn new(ids: impl Into<Arc<[Id]>>, id_type: IdType) -> Self {
        Self {
            ids: ids.into(),
            id_type,
        }
    }

    pub fn empty(id_type: IdType) -> Self {
        Self::new(Vec::new(), id_type)
    }

    /// `id` repeated `len` times.
    pub fn repeated(id: Id, len: usize, id_type: IdType) -> Self {
        Self::new(vec![id; len], id_type)
    }

    /// [`INVALID_ID`] repeated `len` times.
    pub fn placeholders(len: usize, id_type: IdType) -> Self {
        Self::repeated(INVALID_ID, len, id_type)
    }

    pub fn id_type(&self) -> &IdType {
        &self.id_type
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Id> {
        self.ids.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Id] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.ids.iter().copied()
    }

    /// Distinct valid ids as a set; order, duplicates and placeholders are
    /// lost.
    pub fn as_set(&self) -> TypedSet {
        TypedSet::from_ids(self.iter(), self.id_type.clone())
    }

    /// Sub-list over `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> TypedList {
        Self::new(&self.ids[range], self.id_type.clone())
    }

    /// Number of [`INVALID_ID`] placeholders.
    pub fn placeholder_count(&self) -> usize {
        self.ids.iter().filter(|&&id| id == INVALID_ID).count()
    }

    pub fn position(&self, id: Id) -> Option<usize> {
        self.ids.iter().position(|&x| x == id)
    }
}
