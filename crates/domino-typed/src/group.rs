#![forbid(unsafe_code)]

//! Grouped collections: a tagged set or list partitioned into ordered,
//! labeled, colored groups.
//!
//! A [`TypedGroupSet`] is the grouping a data source provides for one axis.
//! A [`TypedGroupList`] is what a chain hands back to each node after
//! aligning: the node's slice of the authoritative ordering plus the derived
//! group boundaries.

use std::cmp::Ordering;
use std::ops::Range;

use domino_core::Rgb;
use rustc_hash::FxHashMap;

use crate::compare::TypedComparator;
use crate::error::GroupPartitionError;
use crate::id_type::{INVALID_ID, Id, IdType};
use crate::list::TypedList;
use crate::set::TypedSet;

/// Reserved group roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupKind {
    #[default]
    Normal,
    /// The single group spanning a whole ungrouped collection.
    Ungrouped,
    /// Placeholder rows with no counterpart in the grouping.
    Unmapped,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupInfo {
    pub label: String,
    pub color: Rgb,
    pub kind: GroupKind,
}

impl GroupInfo {
    pub fn new(label: impl Into<String>, color: Rgb) -> Self {
        Self {
            label: label.into(),
            color,
            kind: GroupKind::Normal,
        }
    }

    pub fn ungrouped() -> Self {
        Self {
            label: String::new(),
            color: Rgb::LIGHT_GRAY,
            kind: GroupKind::Ungrouped,
        }
    }

    pub fn unmapped() -> Self {
        Self {
            label: "Unmapped".to_owned(),
            color: Rgb::GRAY,
            kind: GroupKind::Unmapped,
        }
    }

    /// Same label and color, marked as placeholder.
    #[must_use]
    pub fn as_unmapped(&self) -> Self {
        Self {
            kind: GroupKind::Unmapped,
            ..self.clone()
        }
    }
}

/// Common view of a group.
pub trait TypedGroup {
    fn info(&self) -> &GroupInfo;

    fn id_type(&self) -> &IdType;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn label(&self) -> &str {
        &self.info().label
    }

    fn color(&self) -> Rgb {
        self.info().color
    }

    fn kind(&self) -> GroupKind {
        self.info().kind
    }
}

/// Group with set-membership semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedSetGroup {
    info: GroupInfo,
    set: TypedSet,
}

impl TypedSetGroup {
    pub fn new(set: TypedSet, label: impl Into<String>, color: Rgb) -> Self {
        Self {
            info: GroupInfo::new(label, color),
            set,
        }
    }

    pub fn with_info(set: TypedSet, info: GroupInfo) -> Self {
        Self { info, set }
    }

    pub fn set(&self) -> &TypedSet {
        &self.set
    }

    pub fn contains(&self, id: Id) -> bool {
        self.set.contains(id)
    }
}

impl TypedGroup for TypedSetGroup {
    fn info(&self) -> &GroupInfo {
        &self.info
    }

    fn id_type(&self) -> &IdType {
        self.set.id_type()
    }

    fn len(&self) -> usize {
        self.set.len()
    }
}

/// Group over a contiguous run of an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedListGroup {
    info: GroupInfo,
    list: TypedList,
}

impl TypedListGroup {
    pub fn new(list: TypedList, info: GroupInfo) -> Self {
        Self { info, list }
    }

    pub fn list(&self) -> &TypedList {
        &self.list
    }
}

impl TypedGroup for TypedListGroup {
    fn info(&self) -> &GroupInfo {
        &self.info
    }

    fn id_type(&self) -> &IdType {
        self.list.id_type()
    }

    fn len(&self) -> usize {
        self.list.len()
    }
}

/// A set partitioned into ordered groups.
///
/// Every id of the set is in exactly one group and groups hold no foreign
/// ids. Within a group ids are ordered ascending, so the set has a total
/// "group then position" order, exposed through [`TypedComparator`].
#[derive(Debug, Clone)]
pub struct TypedGroupSet {
    set: TypedSet,
    groups: Vec<TypedSetGroup>,
    ranks: FxHashMap<Id, usize>,
}

impl TypedGroupSet {
    /// Partition `set` into `groups`.
    ///
    /// # Panics
    ///
    /// Panics if `groups` is not a partition of `set`.
    pub fn new(set: TypedSet, groups: Vec<TypedSetGroup>) -> Self {
        match Self::try_new(set, groups) {
            Ok(g) => g,
            Err(err) => panic!("invalid group partition: {err}"),
        }
    }

    /// Checked variant of [`TypedGroupSet::new`].
    pub fn try_new(
        set: TypedSet,
        groups: Vec<TypedSetGroup>,
    ) -> Result<Self, GroupPartitionError> {
        let mut ranks = FxHashMap::default();
        for group in &groups {
            if group.id_type() != set.id_type() {
                return Err(GroupPartitionError::TagMismatch {
                    expected: set.id_type().clone(),
                    found: group.id_type().clone(),
                });
            }
            for id in group.set() {
                if !set.contains(id) {
                    return Err(GroupPartitionError::Foreign { id });
                }
                let rank = ranks.len();
                if ranks.insert(id, rank).is_some() {
                    return Err(GroupPartitionError::Overlap { id });
                }
            }
        }
        if let Some(id) = set.iter().find(|id| !ranks.contains_key(id)) {
            return Err(GroupPartitionError::Uncovered { id });
        }
        Ok(Self { set, groups, ranks })
    }

    /// One unnamed group covering everything.
    pub fn create_ungrouped(set: TypedSet) -> Self {
        let group = TypedSetGroup::with_info(set.clone(), GroupInfo::ungrouped());
        let ranks = set.iter().enumerate().map(|(i, id)| (id, i)).collect();
        Self {
            set,
            groups: vec![group],
            ranks,
        }
    }

    pub fn id_type(&self) -> &IdType {
        self.set.id_type()
    }

    pub fn set(&self) -> &TypedSet {
        &self.set
    }

    pub fn groups(&self) -> &[TypedSetGroup] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// `true` for a single group of kind [`GroupKind::Ungrouped`].
    pub fn is_ungrouped(&self) -> bool {
        matches!(self.groups.as_slice(), [g] if g.kind() == GroupKind::Ungrouped)
    }

    pub fn group_of(&self, id: Id) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }

    /// Position of `id` in group-then-id order.
    pub fn rank(&self, id: Id) -> Option<usize> {
        self.ranks.get(&id).copied()
    }

    /// Ids in group order, with matching list groups.
    pub fn to_group_list(&self) -> TypedGroupList {
        let ids: Vec<Id> = self.groups.iter().flat_map(|g| g.set().iter()).collect();
        let list = TypedList::new(ids, self.id_type().clone());
        TypedGroupList::create(
            list,
            self.groups.iter().map(|g| (g.info().clone(), g.len())),
        )
    }
}

impl PartialEq for TypedGroupSet {
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set && self.groups == other.groups
    }
}

impl Eq for TypedGroupSet {}

impl TypedComparator for TypedGroupSet {
    fn id_type(&self) -> &IdType {
        self.set.id_type()
    }

    /// Group then position; ids outside the set sort last.
    fn compare(&self, a: Id, b: Id) -> Ordering {
        let ra = self.rank(a).unwrap_or(usize::MAX);
        let rb = self.rank(b).unwrap_or(usize::MAX);
        ra.cmp(&rb)
    }
}

/// An ordered list split into consecutive groups whose lengths sum to the
/// list length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedGroupList {
    list: TypedList,
    groups: Vec<TypedListGroup>,
}

impl TypedGroupList {
    /// Cut `list` into consecutive groups of the given lengths.
    ///
    /// # Panics
    ///
    /// Panics if the lengths do not sum to `list.len()`.
    pub fn create(list: TypedList, groups: impl IntoIterator<Item = (GroupInfo, usize)>) -> Self {
        let mut start = 0;
        let mut out = Vec::new();
        for (info, len) in groups {
            assert!(
                start + len <= list.len(),
                "group lengths exceed list length {}",
                list.len()
            );
            out.push(TypedListGroup::new(list.slice(start..start + len), info));
            start += len;
        }
        assert_eq!(start, list.len(), "group lengths must cover the list");
        Self { list, groups: out }
    }

    /// The whole list as one ungrouped group.
    pub fn ungrouped(list: TypedList) -> Self {
        let len = list.len();
        Self::create(list, [(GroupInfo::ungrouped(), len)])
    }

    /// Sentinel group of `size` placeholders marked unmapped.
    pub fn create_unmapped_group(id_type: IdType, size: usize) -> TypedListGroup {
        TypedListGroup::new(
            TypedList::repeated(INVALID_ID, size, id_type),
            GroupInfo::unmapped(),
        )
    }

    /// Sentinel group of `size` placeholders marked ungrouped.
    pub fn create_ungrouped_group(id_type: IdType, size: usize) -> TypedListGroup {
        TypedListGroup::new(
            TypedList::repeated(INVALID_ID, size, id_type),
            GroupInfo::ungrouped(),
        )
    }

    pub fn list(&self) -> &TypedList {
        &self.list
    }

    pub fn groups(&self) -> &[TypedListGroup] {
        &self.groups
    }

    pub fn id_type(&self) -> &IdType {
        self.list.id_type()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Row range of group `index`.
    pub fn group_range(&self, index: usize) -> Option<Range<usize>> {
        let group = self.groups.get(index)?;
        let start: usize = self.groups[..index].iter().map(TypedGroup::len).sum();
        Some(start..start + group.len())
    }

    /// Group containing row `row`.
    pub fn group_at(&self, row: usize) -> Option<usize> {
        let mut end = 0;
        for (i, g) in self.groups.iter().enumerate() {
            end += g.len();
            if row < end {
                return Some(i);
            }
        }
        None
    }
}
