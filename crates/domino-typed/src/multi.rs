#![forbid(unsafe_code)]

//! Index-aligned tuples of tagged id columns.
//!
//! Row `i` of every column names the same logical entity. Rows are joined
//! across compatible identifier spaces by raw id value; a column without the
//! entity holds [`INVALID_ID`] at that row. Ids from incompatible spaces
//! never share a row.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::compare::TypedComparator;
use crate::error::MultiTypedError;
use crate::id_type::{INVALID_ID, Id, IdType};
use crate::list::TypedList;
use crate::set::TypedSet;

/// One entity across all columns.
pub type Row = SmallVec<[Id; 4]>;

/// First valid id of a row; the join key.
fn row_key(row: &Row) -> Option<Id> {
    row.iter().copied().find(|&id| id != INVALID_ID)
}

fn key_column(row: &Row) -> Option<usize> {
    row.iter().position(|&id| id != INVALID_ID)
}

fn column_of(id_types: &[IdType], id_type: &IdType) -> Option<usize> {
    id_types
        .iter()
        .position(|t| t == id_type)
        .or_else(|| id_types.iter().position(|t| t.is_compatible(id_type)))
}

/// Unordered multi-typed collection. Row order is insertion order and
/// carries no meaning until sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTypedSet {
    id_types: Vec<IdType>,
    rows: Vec<Row>,
}

impl MultiTypedSet {
    /// No columns, no rows.
    pub fn empty() -> Self {
        Self {
            id_types: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Single column holding `set` in ascending order.
    pub fn from_set(set: &TypedSet) -> Self {
        Self {
            id_types: vec![set.id_type().clone()],
            rows: set.iter().map(|id| Row::from_slice(&[id])).collect(),
        }
    }

    /// Zip index-aligned components into rows.
    pub fn try_from_components(components: &[TypedList]) -> Result<Self, MultiTypedError> {
        let expected = components.first().map_or(0, TypedList::len);
        if let Some((component, list)) = components
            .iter()
            .enumerate()
            .find(|(_, l)| l.len() != expected)
        {
            return Err(MultiTypedError::RowCountMismatch {
                component,
                expected,
                found: list.len(),
            });
        }
        let rows = (0..expected)
            .map(|i| components.iter().map(|c| c.as_slice()[i]).collect())
            .collect();
        Ok(Self {
            id_types: components.iter().map(|c| c.id_type().clone()).collect(),
            rows,
        })
    }

    /// Every id of every set, one row per distinct id, rows in order of
    /// first appearance. Sets sharing a tag share a column.
    pub fn union_deep<'a>(sets: impl IntoIterator<Item = &'a TypedSet>) -> Self {
        let mut out = Self::empty();
        let mut index: FxHashMap<Id, SmallVec<[usize; 2]>> = FxHashMap::default();
        for set in sets {
            let col = out.ensure_column(set.id_type());
            for id in set {
                let existing = index.get(&id).and_then(|rows| {
                    rows.iter()
                        .copied()
                        .find(|&r| out.key_compatible(&out.rows[r], set.id_type()))
                });
                let row = match existing {
                    Some(row) => row,
                    None => {
                        let blank = out.placeholder_row();
                        out.rows.push(blank);
                        let row = out.rows.len() - 1;
                        index.entry(id).or_default().push(row);
                        row
                    }
                };
                out.rows[row][col] = id;
            }
        }
        out
    }

    /// Rows whose id is in every set. Any set incompatible with the first
    /// leaves no rows.
    pub fn intersect_deep<'a>(sets: impl IntoIterator<Item = &'a TypedSet>) -> Self {
        let sets: Vec<&TypedSet> = sets.into_iter().collect();
        let Some((seed, rest)) = sets.split_first() else {
            return Self::empty();
        };
        let mut out = Self::from_set(seed);
        let compatible = rest.iter().all(|s| s.id_type().is_compatible(seed.id_type()));
        out.rows.retain(|row| {
            compatible && row_key(row).is_some_and(|id| rest.iter().all(|s| s.contains(id)))
        });
        out.expand(rest.iter().copied())
    }

    /// Add a column for every new tag among `sets` and fill it against the
    /// existing rows. Rows absent from a set, or keyed in an incompatible
    /// identifier space, get [`INVALID_ID`]. No rows are added or removed.
    #[must_use]
    pub fn expand<'a>(mut self, sets: impl IntoIterator<Item = &'a TypedSet>) -> Self {
        for set in sets {
            let col = self.ensure_column(set.id_type());
            let id_types = &self.id_types;
            for row in &mut self.rows {
                if row[col] != INVALID_ID {
                    continue;
                }
                let same_space =
                    key_column(row).is_some_and(|k| id_types[k].is_compatible(set.id_type()));
                if !same_space {
                    continue;
                }
                if let Some(id) = row_key(row).filter(|&id| set.contains(id)) {
                    row[col] = id;
                }
            }
        }
        self
    }

    fn ensure_column(&mut self, id_type: &IdType) -> usize {
        if let Some(col) = self.id_types.iter().position(|t| t == id_type) {
            return col;
        }
        self.id_types.push(id_type.clone());
        for row in &mut self.rows {
            row.push(INVALID_ID);
        }
        self.id_types.len() - 1
    }

    fn key_compatible(&self, row: &Row, id_type: &IdType) -> bool {
        key_column(row).is_some_and(|k| self.id_types[k].is_compatible(id_type))
    }

    fn placeholder_row(&self) -> Row {
        SmallVec::from_elem(INVALID_ID, self.id_types.len())
    }

    pub fn id_types(&self) -> &[IdType] {
        &self.id_types
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Valid ids of the column matching `id_type`.
    pub fn column(&self, id_type: &IdType) -> TypedSet {
        match column_of(&self.id_types, id_type) {
            Some(col) => TypedSet::from_ids(self.rows.iter().map(|r| r[col]), id_type.clone()),
            None => TypedSet::empty(id_type.clone()),
        }
    }

    /// Stable sort by a comparator chain. Each comparator applies to the
    /// column with its exact tag, else the first compatible one; comparators
    /// matching no column are ignored.
    pub fn sort(&self, comparators: &[&dyn TypedComparator]) -> MultiTypedList {
        let chain: Vec<(usize, &dyn TypedComparator)> = comparators
            .iter()
            .filter_map(|&c| column_of(&self.id_types, c.id_type()).map(|col| (col, c)))
            .collect();
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            chain
                .iter()
                .map(|&(col, cmp)| cmp.compare(a[col], b[col]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        MultiTypedList {
            id_types: self.id_types.clone(),
            rows,
        }
    }

    /// Rows in their current order.
    pub fn to_list(&self) -> MultiTypedList {
        MultiTypedList {
            id_types: self.id_types.clone(),
            rows: self.rows.clone(),
        }
    }
}

/// Ordered multi-typed collection; the authoritative ordering of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiTypedList {
    id_types: Vec<IdType>,
    rows: Vec<Row>,
}

impl MultiTypedList {
    pub fn id_types(&self) -> &[IdType] {
        &self.id_types
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Column index for `id_type`: exact tag first, then compatible.
    pub fn column_index(&self, id_type: &IdType) -> Option<usize> {
        column_of(&self.id_types, id_type)
    }

    /// The column for `id_type` as a list tagged `id_type`, or all
    /// placeholders when no column matches.
    pub fn slice(&self, id_type: &IdType) -> TypedList {
        match self.column_index(id_type) {
            Some(col) => TypedList::new(
                self.rows.iter().map(|r| r[col]).collect::<Vec<_>>(),
                id_type.clone(),
            ),
            None => TypedList::placeholders(self.rows.len(), id_type.clone()),
        }
    }

    /// Back to an unordered collection with the same rows.
    pub fn as_set(&self) -> MultiTypedSet {
        MultiTypedSet {
            id_types: self.id_types.clone(),
            rows: self.rows.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::NaturalOrder;
    use crate::id_type::IdCategory;

    fn tags() -> (IdType, IdType) {
        let cat = IdCategory::new("patient");
        (
            IdType::new("patient_a", cat.clone()),
            IdType::new("patient_b", cat),
        )
    }

    #[test]
    fn union_deep_joins_by_id() {
        let (x, y) = tags();
        let a = TypedSet::from_ids([1, 2, 3], x.clone());
        let b = TypedSet::from_ids([2, 3, 4], y.clone());
        let m = MultiTypedSet::union_deep([&a, &b]);
        assert_eq!(m.id_types(), &[x.clone(), y.clone()]);
        assert_eq!(m.len(), 4);
        let list = m.to_list();
        assert_eq!(list.slice(&x).as_slice(), &[1, 2, 3, INVALID_ID]);
        assert_eq!(list.slice(&y).as_slice(), &[INVALID_ID, 2, 3, 4]);
    }

    #[test]
    fn incompatible_spaces_never_share_rows() {
        let (x, _) = tags();
        let gene = IdType::new("gene", IdCategory::new("gene"));
        let a = TypedSet::from_ids([1, 2], x.clone());
        let g = TypedSet::from_ids([1, 9], gene.clone());
        let m = MultiTypedSet::union_deep([&a, &g]);
        assert_eq!(m.len(), 4);
        let list = m.to_list();
        assert_eq!(list.slice(&x).as_slice(), &[1, 2, INVALID_ID, INVALID_ID]);
        assert_eq!(list.slice(&gene).as_slice(), &[INVALID_ID, INVALID_ID, 1, 9]);

        let expanded = MultiTypedSet::from_set(&a).expand([&g]);
        assert_eq!(expanded.len(), 2);
        assert!(expanded.column(&gene).is_empty());

        assert!(MultiTypedSet::intersect_deep([&a, &g]).is_empty());
    }

    #[test]
    fn same_tag_shares_a_column() {
        let (x, _) = tags();
        let a = TypedSet::from_ids([1, 2], x.clone());
        let b = TypedSet::from_ids([2, 5], x.clone());
        let m = MultiTypedSet::union_deep([&a, &b]);
        assert_eq!(m.id_types().len(), 1);
        assert_eq!(m.column(&x), TypedSet::from_ids([1, 2, 5], x));
    }

    #[test]
    fn intersect_deep_keeps_shared_rows() {
        let (x, y) = tags();
        let a = TypedSet::from_ids([1, 2, 3], x.clone());
        let b = TypedSet::from_ids([2, 3, 4], y.clone());
        let m = MultiTypedSet::intersect_deep([&a, &b]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.to_list().slice(&y).as_slice(), &[2, 3]);
    }

    #[test]
    fn expand_inserts_placeholders_without_adding_rows() {
        let (x, y) = tags();
        let a = TypedSet::from_ids([1, 2, 3], x);
        let b = TypedSet::from_ids([3, 9], y.clone());
        let m = MultiTypedSet::from_set(&a).expand([&b]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.to_list().slice(&y).as_slice(), &[INVALID_ID, INVALID_ID, 3]);
    }

    #[test]
    fn sort_uses_compatible_column_and_is_stable() {
        let (x, y) = tags();
        let a = TypedSet::from_ids([3, 1, 2], x.clone());
        let m = MultiTypedSet::union_deep([&a]);
        let desc = Reversed(NaturalOrder::new(y));
        let sorted = m.sort(&[&desc]);
        assert_eq!(sorted.slice(&x).as_slice(), &[3, 2, 1]);
    }

    #[test]
    fn components_must_align() {
        let (x, y) = tags();
        let ok = MultiTypedSet::try_from_components(&[
            TypedList::new(vec![1, 2], x.clone()),
            TypedList::new(vec![INVALID_ID, 2], y.clone()),
        ])
        .unwrap();
        assert_eq!(ok.len(), 2);
        let err = MultiTypedSet::try_from_components(&[
            TypedList::new(vec![1, 2], x),
            TypedList::new(vec![2], y),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            MultiTypedError::RowCountMismatch {
                component: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn slice_of_unknown_tag_is_placeholders() {
        let (x, _) = tags();
        let other = IdType::new("gene", IdCategory::new("gene"));
        let list = MultiTypedSet::from_set(&TypedSet::from_ids([1, 2], x)).to_list();
        assert_eq!(list.slice(&other).placeholder_count(), 2);
    }

    struct Reversed(NaturalOrder);

    impl TypedComparator for Reversed {
        fn id_type(&self) -> &IdType {
            self.0.id_type()
        }

        fn compare(&self, a: Id, b: Id) -> Ordering {
            self.0.compare(b, a)
        }
    }
}
