#![forbid(unsafe_code)]

//! Node records and the arena that owns them.
//!
//! Nodes never point at each other directly. Each [`Node`] keeps four
//! optional neighbor slots holding [`NodeId`]s into the same [`NodeArena`];
//! chains and blocks hold ids only.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use domino_core::{Axis, Direction, Point, Rect, Size};
use domino_typed::{IdType, TypedComparator, TypedGroupList, TypedGroupSet};

/// Stable identifier of a node within its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node shows: its identifiers per axis and how to order them.
///
/// `data(Axis::Vertical)` holds the row identifiers (laid out top to
/// bottom), `data(Axis::Horizontal)` the column identifiers.
pub trait NodeSource: fmt::Debug {
    fn label(&self) -> &str;

    /// Grouped identifiers along `axis`, `None` if the node has no such axis.
    fn data(&self, axis: Axis) -> Option<&TypedGroupSet>;

    /// Ordering used when this node is a sort criterion. Defaults to the
    /// group order of [`NodeSource::data`].
    fn comparator(&self, axis: Axis) -> Option<&dyn TypedComparator> {
        self.data(axis).map(|d| d as &dyn TypedComparator)
    }

    /// Whether single identifiers can be located along `axis`, which
    /// enables detail bands.
    fn supports_detail(&self, axis: Axis) -> bool {
        self.data(axis).is_some()
    }
}

/// Plain in-memory source: a label plus grouped rows and columns.
#[derive(Debug, Clone)]
pub struct TableSource {
    label: String,
    data: [Option<TypedGroupSet>; 2],
    detail: [bool; 2],
}

impl TableSource {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: [None, None],
            detail: [true, true],
        }
    }

    /// Row identifiers (vertical axis).
    #[must_use]
    pub fn with_rows(self, rows: TypedGroupSet) -> Self {
        self.with_data(Axis::Vertical, rows)
    }

    /// Column identifiers (horizontal axis).
    #[must_use]
    pub fn with_columns(self, columns: TypedGroupSet) -> Self {
        self.with_data(Axis::Horizontal, columns)
    }

    #[must_use]
    pub fn with_data(mut self, axis: Axis, data: TypedGroupSet) -> Self {
        self.data[axis.index()] = Some(data);
        self
    }

    /// Mark `axis` as unable to locate single identifiers.
    #[must_use]
    pub fn without_detail(mut self, axis: Axis) -> Self {
        self.detail[axis.index()] = false;
        self
    }
}

impl NodeSource for TableSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn data(&self, axis: Axis) -> Option<&TypedGroupSet> {
        self.data[axis.index()].as_ref()
    }

    fn supports_detail(&self, axis: Axis) -> bool {
        self.detail[axis.index()] && self.data(axis).is_some()
    }
}

/// A placed dataset: source, grid neighbors, geometry, and the grouped
/// ordering its chains last pushed onto it.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    source: Box<dyn NodeSource>,
    neighbors: [Option<NodeId>; 4],
    location: Point,
    scale: [f32; 2],
    detached: f32,
    displayed: [Option<TypedGroupList>; 2],
}

impl Node {
    fn new(id: NodeId, source: Box<dyn NodeSource>) -> Self {
        let displayed = Axis::ALL.map(|axis| source.data(axis).map(TypedGroupSet::to_group_list));
        Self {
            id,
            source,
            neighbors: [None; 4],
            location: Point::ZERO,
            scale: [1.0, 1.0],
            detached: 0.0,
            displayed,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn source(&self) -> &dyn NodeSource {
        self.source.as_ref()
    }

    pub fn label(&self) -> &str {
        self.source.label()
    }

    /// `true` if the node has identifiers along `axis`.
    pub fn has(&self, axis: Axis) -> bool {
        self.source.data(axis).is_some()
    }

    pub fn data(&self, axis: Axis) -> Option<&TypedGroupSet> {
        self.source.data(axis)
    }

    pub fn id_type(&self, axis: Axis) -> Option<&IdType> {
        self.source.data(axis).map(TypedGroupSet::id_type)
    }

    pub fn comparator(&self, axis: Axis) -> Option<&dyn TypedComparator> {
        self.source.comparator(axis)
    }

    pub fn supports_detail(&self, axis: Axis) -> bool {
        self.source.supports_detail(axis)
    }

    pub fn neighbor(&self, dir: Direction) -> Option<NodeId> {
        self.neighbors[dir.index()]
    }

    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.neighbor(dir).map(|n| (dir, n)))
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        self.location = location;
    }

    /// Rows shown along `axis`: the displayed ordering if any, else the
    /// source data, at least one.
    pub fn row_count(&self, axis: Axis) -> usize {
        let rows = match (&self.displayed[axis.index()], self.source.data(axis)) {
            (Some(list), _) => list.len(),
            (None, Some(data)) => data.len(),
            (None, None) => 1,
        };
        rows.max(1)
    }

    pub fn scale(&self, axis: Axis) -> f32 {
        self.scale[axis.index()]
    }

    pub fn set_scale(&mut self, axis: Axis, scale: f32) {
        self.scale[axis.index()] = scale;
    }

    /// Multiply both scales by `factor`, keeping every extent at least
    /// `min_extent`.
    pub fn zoom(&mut self, factor: f32, min_extent: f32) {
        for axis in Axis::ALL {
            let rows = self.row_count(axis) as f32;
            let scale = (self.scale(axis) * factor).max(min_extent / rows);
            self.set_scale(axis, scale);
        }
    }

    pub fn extent(&self, axis: Axis) -> f32 {
        self.row_count(axis) as f32 * self.scale(axis)
    }

    pub fn size(&self) -> Size {
        Size::new(self.extent(Axis::Horizontal), self.extent(Axis::Vertical))
    }

    /// Bounds relative to the owning block.
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.location, self.size())
    }

    /// Gap requested next to this node, `0.0` when attached.
    pub fn detached_offset(&self) -> f32 {
        self.detached
    }

    pub fn is_detached(&self) -> bool {
        self.detached > 0.0
    }

    pub fn set_detached_offset(&mut self, offset: f32) {
        self.detached = offset.max(0.0);
    }

    /// The grouped ordering last pushed along `axis`.
    pub fn displayed(&self, axis: Axis) -> Option<&TypedGroupList> {
        self.displayed[axis.index()].as_ref()
    }

    /// Replace the displayed ordering along `axis`. Returns `true` if it
    /// differs from the previous one.
    pub fn set_data(&mut self, axis: Axis, data: TypedGroupList) -> bool {
        let slot = &mut self.displayed[axis.index()];
        if slot.as_ref() == Some(&data) {
            return false;
        }
        *slot = Some(data);
        true
    }
}

/// Owner of every node record.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u32,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new node and return its id.
    pub fn insert(&mut self, source: impl NodeSource + 'static) -> NodeId {
        self.insert_boxed(Box::new(source))
    }

    pub fn insert_boxed(&mut self, source: Box<dyn NodeSource>) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let _ = self.nodes.insert(id, Node::new(id, source));
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Remove a node, clearing the back-links of its neighbors.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        for (dir, n) in node.neighbors() {
            if let Some(other) = self.nodes.get_mut(&n)
                && other.neighbor(dir.opposite()) == Some(id)
            {
                other.neighbors[dir.opposite().index()] = None;
            }
        }
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        self.get(id).and_then(|n| n.neighbor(dir))
    }

    /// Set `a`'s `dir` slot to `b` and `b`'s opposite slot to `a`.
    pub fn link(&mut self, a: NodeId, dir: Direction, b: Option<NodeId>) {
        self[a].neighbors[dir.index()] = b;
        if let Some(b) = b {
            self[b].neighbors[dir.opposite().index()] = Some(a);
        }
    }

    /// Clear `a`'s `dir` slot and the matching back-link.
    pub fn unlink(&mut self, a: NodeId, dir: Direction) {
        if let Some(b) = self[a].neighbors[dir.index()].take()
            && let Some(other) = self.nodes.get_mut(&b)
            && other.neighbor(dir.opposite()) == Some(a)
        {
            other.neighbors[dir.opposite().index()] = None;
        }
    }

    /// Reset all neighbor slots and geometry of a node about to be placed.
    pub fn reset(&mut self, id: NodeId) {
        for dir in Direction::ALL {
            self.unlink(id, dir);
        }
        self[id].location = Point::ZERO;
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("node {id} is not in the arena"),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("node {id} is not in the arena"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domino_typed::{IdCategory, TypedSet};

    fn rows(ids: &[u32]) -> TypedGroupSet {
        let tag = IdType::new("sample", IdCategory::new("sample"));
        TypedGroupSet::create_ungrouped(TypedSet::from_ids(ids.iter().copied(), tag))
    }

    #[test]
    fn link_sets_both_slots() {
        let mut arena = NodeArena::new();
        let a = arena.insert(TableSource::new("a").with_rows(rows(&[1])));
        let b = arena.insert(TableSource::new("b").with_rows(rows(&[1])));
        arena.link(a, Direction::East, Some(b));
        assert_eq!(arena.neighbor(a, Direction::East), Some(b));
        assert_eq!(arena.neighbor(b, Direction::West), Some(a));
        arena.unlink(b, Direction::West);
        assert_eq!(arena.neighbor(a, Direction::East), None);
    }

    #[test]
    fn remove_clears_back_links() {
        let mut arena = NodeArena::new();
        let a = arena.insert(TableSource::new("a"));
        let b = arena.insert(TableSource::new("b"));
        arena.link(a, Direction::South, Some(b));
        assert!(arena.remove(b).is_some());
        assert_eq!(arena.neighbor(a, Direction::South), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn size_follows_rows_and_scale() {
        let mut arena = NodeArena::new();
        let a = arena.insert(TableSource::new("a").with_rows(rows(&[1, 2, 3, 4])));
        let node = &mut arena[a];
        assert_eq!(node.size(), Size::new(1.0, 4.0));
        node.set_scale(Axis::Vertical, 5.0);
        assert_eq!(node.extent(Axis::Vertical), 20.0);
        node.zoom(0.1, 10.0);
        assert_eq!(node.extent(Axis::Vertical), 10.0);
        assert_eq!(node.extent(Axis::Horizontal), 10.0);
    }

    #[test]
    fn set_data_reports_change() {
        let mut arena = NodeArena::new();
        let a = arena.insert(TableSource::new("a").with_rows(rows(&[1, 2])));
        let same = arena[a].displayed(Axis::Vertical).cloned().unwrap();
        assert!(!arena[a].set_data(Axis::Vertical, same.clone()));
        let other = TypedGroupList::ungrouped(same.list().slice(0..1));
        assert!(arena[a].set_data(Axis::Vertical, other));
        assert_eq!(arena[a].row_count(Axis::Vertical), 1);
    }

    #[test]
    fn detail_support_requires_data() {
        let source = TableSource::new("t")
            .with_rows(rows(&[1]))
            .without_detail(Axis::Vertical);
        assert!(!source.supports_detail(Axis::Vertical));
        assert!(!source.supports_detail(Axis::Horizontal));
        assert!(TableSource::new("u").with_rows(rows(&[1])).supports_detail(Axis::Vertical));
    }
}
