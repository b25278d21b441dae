#![forbid(unsafe_code)]

//! Immutable tagged id sets and their algebra.
//!
//! A [`TypedSet`] is either backed by a [`RoaringBitmap`] (dense) or by a
//! `BTreeSet` (sparse). The representation is picked at construction from
//! the id span; both iterate in ascending order. Binary operations take the
//! bitmap fast path when both operands are dense.
//!
//! Operations never fail on tag mismatch. Incompatible operands give an
//! empty set (or the neutral count), tagged like the left operand.
//!
//! Results that equal an operand return that operand itself, which callers
//! can detect with [`TypedSet::ptr_eq`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use roaring::RoaringBitmap;

use crate::id_type::{INVALID_ID, Id, IdType};
use crate::list::TypedList;

/// Below this size a set always stays sparse.
const DENSE_MIN_LEN: u64 = 64;
/// Dense when `span <= len * DENSE_SPAN_RATIO`.
const DENSE_SPAN_RATIO: u64 = 8;

#[derive(Debug)]
enum IdRepr {
    Dense(RoaringBitmap),
    Sparse(BTreeSet<Id>),
}

impl IdRepr {
    fn len(&self) -> usize {
        match self {
            Self::Dense(b) => b.len() as usize,
            Self::Sparse(s) => s.len(),
        }
    }

    fn contains(&self, id: Id) -> bool {
        match self {
            Self::Dense(b) => b.contains(id),
            Self::Sparse(s) => s.contains(&id),
        }
    }

    fn from_bitmap(bitmap: RoaringBitmap) -> Self {
        if prefers_dense(bitmap.len(), bitmap.min(), bitmap.max()) {
            Self::Dense(bitmap)
        } else {
            Self::Sparse(bitmap.iter().collect())
        }
    }

    fn from_btree(set: BTreeSet<Id>) -> Self {
        let len = set.len() as u64;
        if prefers_dense(len, set.first().copied(), set.last().copied()) {
            Self::Dense(set.into_iter().collect())
        } else {
            Self::Sparse(set)
        }
    }
}

fn prefers_dense(len: u64, min: Option<Id>, max: Option<Id>) -> bool {
    match (min, max) {
        (Some(lo), Some(hi)) if len >= DENSE_MIN_LEN => {
            let span = u64::from(hi - lo) + 1;
            span <= len * DENSE_SPAN_RATIO
        }
        _ => false,
    }
}

/// Ascending iterator over the ids of a [`TypedSet`].
pub enum Iter<'a> {
    Dense(roaring::bitmap::Iter<'a>),
    Sparse(std::collections::btree_set::Iter<'a, Id>),
}

impl Iterator for Iter<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        match self {
            Self::Dense(it) => it.next(),
            Self::Sparse(it) => it.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Dense(it) => it.size_hint(),
            Self::Sparse(it) => it.size_hint(),
        }
    }
}

/// Immutable, deduplicated set of ids from one identifier space.
///
/// [`INVALID_ID`] is never a member. Cloning shares the underlying storage.
#[derive(Clone)]
pub struct TypedSet {
    ids: Arc<IdRepr>,
    id_type: IdType,
}

impl TypedSet {
    /// Empty set in `id_type`.
    pub fn empty(id_type: IdType) -> Self {
        Self {
            ids: Arc::new(IdRepr::Sparse(BTreeSet::new())),
            id_type,
        }
    }

    /// Build from any ids; duplicates and [`INVALID_ID`] are dropped.
    pub fn from_ids(ids: impl IntoIterator<Item = Id>, id_type: IdType) -> Self {
        let set: BTreeSet<Id> = ids.into_iter().filter(|&id| id != INVALID_ID).collect();
        Self {
            ids: Arc::new(IdRepr::from_btree(set)),
            id_type,
        }
    }

    fn from_bitmap(bitmap: RoaringBitmap, id_type: IdType) -> Self {
        Self {
            ids: Arc::new(IdRepr::from_bitmap(bitmap)),
            id_type,
        }
    }

    pub fn id_type(&self) -> &IdType {
        &self.id_type
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when backed by the bitmap representation.
    pub fn is_dense(&self) -> bool {
        matches!(*self.ids, IdRepr::Dense(_))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> Iter<'_> {
        match &*self.ids {
            IdRepr::Dense(b) => Iter::Dense(b.iter()),
            IdRepr::Sparse(s) => Iter::Sparse(s.iter()),
        }
    }

    pub fn min(&self) -> Option<Id> {
        self.iter().next()
    }

    pub fn max(&self) -> Option<Id> {
        match &*self.ids {
            IdRepr::Dense(b) => b.max(),
            IdRepr::Sparse(s) => s.last().copied(),
        }
    }

    /// Ids in ascending order as a list with the same tag.
    pub fn as_list(&self) -> TypedList {
        TypedList::new(self.iter().collect::<Vec<_>>(), self.id_type.clone())
    }

    /// Same storage and same tag.
    pub fn ptr_eq(&self, other: &TypedSet) -> bool {
        Arc::ptr_eq(&self.ids, &other.ids) && self.id_type == other.id_type
    }

    pub fn is_compatible(&self, other: &TypedSet) -> bool {
        self.id_type.is_compatible(&other.id_type)
    }

    fn dense_pair<'a>(&'a self, other: &'a TypedSet) -> Option<(&'a RoaringBitmap, &'a RoaringBitmap)> {
        match (&*self.ids, &*other.ids) {
            (IdRepr::Dense(a), IdRepr::Dense(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Ids in both sets.
    #[must_use]
    pub fn intersect(&self, other: &TypedSet) -> TypedSet {
        if self.is_empty() {
            return self.clone();
        }
        if other.is_empty() {
            return other.clone();
        }
        if !self.is_compatible(other) {
            return TypedSet::empty(self.id_type.clone());
        }
        let result = match self.dense_pair(other) {
            Some((a, b)) => TypedSet::from_bitmap(a & b, self.id_type.clone()),
            None => {
                let (small, large) = if self.len() <= other.len() {
                    (self, other)
                } else {
                    (other, self)
                };
                TypedSet::from_ids(
                    small.iter().filter(|&id| large.contains(id)),
                    self.id_type.clone(),
                )
            }
        };
        if result.len() == self.len() {
            self.clone()
        } else if result.len() == other.len() {
            other.clone()
        } else {
            result
        }
    }

    /// Ids in either set.
    #[must_use]
    pub fn union(&self, other: &TypedSet) -> TypedSet {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        if !self.is_compatible(other) {
            return TypedSet::empty(self.id_type.clone());
        }
        let result = match self.dense_pair(other) {
            Some((a, b)) => TypedSet::from_bitmap(a | b, self.id_type.clone()),
            None => TypedSet::from_ids(self.iter().chain(other.iter()), self.id_type.clone()),
        };
        if result.len() == self.len() {
            self.clone()
        } else if result.len() == other.len() {
            other.clone()
        } else {
            result
        }
    }

    /// Ids of `self` not in `other`. Returns `self` when either side is
    /// empty or the tags are incompatible.
    #[must_use]
    pub fn difference(&self, other: &TypedSet) -> TypedSet {
        if self.is_empty() || other.is_empty() || !self.is_compatible(other) {
            return self.clone();
        }
        let result = match self.dense_pair(other) {
            Some((a, b)) => TypedSet::from_bitmap(a - b, self.id_type.clone()),
            None => TypedSet::from_ids(
                self.iter().filter(|&id| !other.contains(id)),
                self.id_type.clone(),
            ),
        };
        if result.len() == self.len() {
            self.clone()
        } else {
            result
        }
    }

    /// `|self ∩ other|` without building the intersection.
    pub fn and_count(&self, other: &TypedSet) -> usize {
        if self.is_empty() || other.is_empty() || !self.is_compatible(other) {
            return 0;
        }
        match self.dense_pair(other) {
            Some((a, b)) => a.intersection_len(b) as usize,
            None => {
                let (small, large) = if self.len() <= other.len() {
                    (self, other)
                } else {
                    (other, self)
                };
                small.iter().filter(|&id| large.contains(id)).count()
            }
        }
    }

    /// `|self ∪ other|`, following the empty and incompatible rules of
    /// [`TypedSet::union`].
    pub fn or_count(&self, other: &TypedSet) -> usize {
        if self.is_empty() {
            return other.len();
        }
        if other.is_empty() {
            return self.len();
        }
        if !self.is_compatible(other) {
            return 0;
        }
        match self.dense_pair(other) {
            Some((a, b)) => a.union_len(b) as usize,
            None => self.len() + other.len() - self.and_count(other),
        }
    }

    /// `|self \ other|`, following the rules of [`TypedSet::difference`].
    pub fn without_count(&self, other: &TypedSet) -> usize {
        if self.is_empty() || other.is_empty() || !self.is_compatible(other) {
            return self.len();
        }
        match self.dense_pair(other) {
            Some((a, b)) => a.difference_len(b) as usize,
            None => self.len() - self.and_count(other),
        }
    }

    /// Union of a sequence; `None` for an empty sequence.
    ///
    /// The result carries the first set's tag. Sets incompatible with it
    /// are skipped.
    pub fn union_all<'a>(sets: impl IntoIterator<Item = &'a TypedSet>) -> Option<TypedSet> {
        let mut iter = sets.into_iter();
        let first = iter.next()?.clone();
        let id_type = first.id_type.clone();
        let mut acc = first;
        for set in iter {
            if !set.id_type.is_compatible(&id_type) {
                domino_core::warn!(
                    skipped = %set.id_type,
                    kept = %id_type,
                    "union_all skipped incompatible set"
                );
                continue;
            }
            acc = acc.union(set);
        }
        Some(acc.retag(id_type))
    }

    /// Intersection of a sequence; `None` for an empty sequence.
    ///
    /// The result carries the first set's tag. Any incompatible member
    /// makes the result empty.
    pub fn intersection_all<'a>(
        sets: impl IntoIterator<Item = &'a TypedSet>,
    ) -> Option<TypedSet> {
        let mut iter = sets.into_iter();
        let first = iter.next()?.clone();
        let id_type = first.id_type.clone();
        let mut acc = first;
        for set in iter {
            if !set.id_type.is_compatible(&id_type) {
                domino_core::warn!(
                    incompatible = %set.id_type,
                    kept = %id_type,
                    "intersection_all hit incompatible set"
                );
                return Some(TypedSet::empty(id_type));
            }
            acc = acc.intersect(set);
        }
        Some(acc.retag(id_type))
    }

    /// Same ids under another tag. Shares storage.
    #[must_use]
    pub fn retag(self, id_type: IdType) -> TypedSet {
        if self.id_type == id_type {
            return self;
        }
        TypedSet {
            ids: self.ids,
            id_type,
        }
    }
}

impl PartialEq for TypedSet {
    fn eq(&self, other: &Self) -> bool {
        if self.id_type != other.id_type || self.len() != other.len() {
            return false;
        }
        if Arc::ptr_eq(&self.ids, &other.ids) {
            return true;
        }
        self.iter().eq(other.iter())
    }
}

impl Eq for TypedSet {}

impl fmt::Debug for TypedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSet")
            .field("id_type", &self.id_type.name())
            .field("dense", &self.is_dense())
            .field("ids", &DebugIds(self))
            .finish()
    }
}

struct DebugIds<'a>(&'a TypedSet);

impl fmt::Debug for DebugIds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a TypedSet {
    type Item = Id;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_type::IdCategory;

    fn gene() -> IdType {
        IdType::new("gene", IdCategory::new("gene"))
    }

    fn patient() -> IdType {
        IdType::new("patient", IdCategory::new("patient"))
    }

    fn set(ids: &[Id]) -> TypedSet {
        TypedSet::from_ids(ids.iter().copied(), gene())
    }

    #[test]
    fn construction_dedups_and_drops_invalid() {
        let s = TypedSet::from_ids([3, 1, 3, INVALID_ID, 2], gene());
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(!s.contains(INVALID_ID));
        assert!(!s.is_dense());
    }

    #[test]
    fn contiguous_large_sets_are_dense() {
        let s = TypedSet::from_ids(0..1000, gene());
        assert!(s.is_dense());
        let sparse = TypedSet::from_ids((0..100).map(|i| i * 10_000), gene());
        assert!(!sparse.is_dense());
        assert_eq!(s.max(), Some(999));
        assert_eq!(s.min(), Some(0));
    }

    #[test]
    fn intersect_returns_operand_when_subset() {
        let a = set(&[1, 2, 3, 4]);
        let b = set(&[2, 3]);
        let i = a.intersect(&b);
        assert!(i.ptr_eq(&b));
        let i = b.intersect(&a);
        assert!(i.ptr_eq(&b));
    }

    #[test]
    fn intersect_with_empty_returns_empty_operand() {
        let a = set(&[1, 2]);
        let e = TypedSet::empty(patient());
        assert!(a.intersect(&e).ptr_eq(&e));
        assert!(e.intersect(&a).ptr_eq(&e));
    }

    #[test]
    fn incompatible_intersect_is_empty_with_left_tag() {
        let a = set(&[1, 2]);
        let b = TypedSet::from_ids([1, 2], patient());
        let i = a.intersect(&b);
        assert!(i.is_empty());
        assert_eq!(i.id_type(), &gene());
        assert_eq!(a.and_count(&b), 0);
        assert_eq!(a.or_count(&b), 0);
        assert_eq!(a.without_count(&b), 2);
        assert!(a.difference(&b).ptr_eq(&a));
    }

    #[test]
    fn union_returns_larger_operand_when_superset() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2]);
        assert!(a.union(&b).ptr_eq(&a));
        assert!(b.union(&a).ptr_eq(&a));
        let c = set(&[4]);
        assert_eq!(a.union(&c), set(&[1, 2, 3, 4]));
    }

    #[test]
    fn difference_rules() {
        let a = set(&[1, 2, 3]);
        assert_eq!(a.difference(&set(&[2])), set(&[1, 3]));
        assert!(a.difference(&set(&[9])).ptr_eq(&a));
        assert!(a.difference(&TypedSet::empty(gene())).ptr_eq(&a));
    }

    #[test]
    fn counts_with_empty_operands() {
        let a = set(&[1, 2, 3]);
        let e = TypedSet::empty(gene());
        assert_eq!(a.or_count(&e), 3);
        assert_eq!(e.or_count(&a), 3);
        assert_eq!(a.without_count(&e), 3);
        assert_eq!(e.without_count(&a), 0);
        assert_eq!(a.and_count(&e), 0);
    }

    #[test]
    fn dense_fast_path_matches_generic() {
        let a = TypedSet::from_ids(0..500, gene());
        let b = TypedSet::from_ids(250..800, gene());
        assert!(a.is_dense() && b.is_dense());
        assert_eq!(a.and_count(&b), 250);
        assert_eq!(a.or_count(&b), 800);
        assert_eq!(a.without_count(&b), 250);
        assert_eq!(a.intersect(&b), TypedSet::from_ids(250..500, gene()));
        let mixed = set(&[1, 499, 700, 5000]);
        assert_eq!(a.intersect(&mixed), set(&[1, 499]));
        assert_eq!(a.and_count(&mixed), 2);
    }

    #[test]
    fn union_all_and_intersection_all() {
        let sets = [set(&[1, 2]), set(&[2, 3]), TypedSet::from_ids([9], patient())];
        let u = TypedSet::union_all(&sets).unwrap();
        assert_eq!(u, set(&[1, 2, 3]));
        let i = TypedSet::intersection_all(&sets[..2]).unwrap();
        assert_eq!(i, set(&[2]));
        let i = TypedSet::intersection_all(&sets).unwrap();
        assert!(i.is_empty());
        assert_eq!(i.id_type(), &gene());
        assert!(TypedSet::union_all(std::iter::empty()).is_none());
    }

    #[test]
    fn compatible_tags_result_carries_left_tag() {
        let cat = IdCategory::new("gene");
        let a = TypedSet::from_ids([1, 2], IdType::new("symbol", cat.clone()));
        let b = TypedSet::from_ids([2, 3], IdType::new("entrez", cat));
        let u = a.union(&b);
        assert_eq!(u.id_type(), a.id_type());
        assert_eq!(u.len(), 3);
    }

    #[test]
    fn list_round_trip() {
        let a = set(&[5, 1, 3]);
        assert_eq!(a.as_list().as_set(), a);
    }
}
