//! Property-based laws for chain edits.
//!
//! Inserting a node anywhere in a chain of 1 to 5 nodes and removing it
//! again restores every original member's ordering, grouping, location and
//! neighbor slots, and the chain's sort state.

use domino_core::{Axis, Direction, Point, Rgb};
use domino_layout::{Domino, NodeId, TableSource};
use domino_typed::{Id, IdCategory, IdType, TypedGroupSet, TypedSet, TypedSetGroup};
use proptest::prelude::*;

fn tag() -> IdType {
    IdType::new("sample", IdCategory::new("sample"))
}

/// Even and odd ids as two groups, or ungrouped when one side is empty.
fn parity_groups(ids: &[Id]) -> TypedGroupSet {
    let all = TypedSet::from_ids(ids.iter().copied(), tag());
    let even = TypedSet::from_ids(ids.iter().copied().filter(|i| i % 2 == 0), tag());
    let odd = TypedSet::from_ids(ids.iter().copied().filter(|i| i % 2 == 1), tag());
    if even.is_empty() || odd.is_empty() {
        return TypedGroupSet::create_ungrouped(all);
    }
    TypedGroupSet::new(
        all,
        vec![
            TypedSetGroup::new(even, "even", Rgb::RED),
            TypedSetGroup::new(odd, "odd", Rgb::MAGENTA),
        ],
    )
}

fn ids() -> impl Strategy<Value = Vec<Id>> {
    prop::collection::vec(0u32..30, 1..12)
}

type Snapshot = Vec<(NodeId, Option<domino_typed::TypedGroupList>, Point, [Option<NodeId>; 4])>;

fn snapshot(domino: &Domino, nodes: &[NodeId]) -> Snapshot {
    nodes
        .iter()
        .map(|&n| {
            let node = &domino.arena()[n];
            (
                n,
                node.displayed(Axis::Vertical).cloned(),
                node.location(),
                Direction::ALL.map(|d| node.neighbor(d)),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn insert_then_remove_restores_chain(
        (members, extra, at) in (1usize..=5).prop_flat_map(|n| {
            (prop::collection::vec(ids(), n), ids(), 0..=n)
        })
    ) {
        let mut domino = Domino::new();
        let nodes: Vec<NodeId> = members
            .iter()
            .enumerate()
            .map(|(i, m)| {
                domino.create_node(TableSource::new(format!("n{i}")).with_rows(parity_groups(m)))
            })
            .collect();
        let block = domino.add_block(nodes[0], Point::new(10.0, 10.0)).unwrap();
        for pair in nodes.windows(2) {
            domino.add_node(block, pair[0], Direction::East, pair[1]).unwrap();
        }

        let chain_state = |d: &Domino| {
            d.block(block)
                .and_then(|b| b.chain(nodes[0], Axis::Horizontal))
                .map(|c| (c.sort_state(), c.data_selection(), c.nodes().to_vec()))
        };
        let before = snapshot(&domino, &nodes);
        let state_before = chain_state(&domino);
        let location_before = domino.block(block).map(|b| b.location());

        let new = domino.create_node(TableSource::new("new").with_rows(parity_groups(&extra)));
        let (neighbor, dir) = if at == 0 {
            (nodes[0], Direction::West)
        } else {
            (nodes[at - 1], Direction::East)
        };
        domino.add_node(block, neighbor, dir, new).unwrap();
        prop_assert_eq!(domino.block(block).map(|b| b.len()), Some(nodes.len() + 1));

        prop_assert_eq!(domino.remove_node(new), Ok((block, false)));
        prop_assert_eq!(snapshot(&domino, &nodes), before);
        prop_assert_eq!(chain_state(&domino), state_before);
        prop_assert_eq!(domino.block(block).map(|b| b.location()), location_before);
    }
}
