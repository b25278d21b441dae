use domino_core::{Direction, Point, Rect};
use domino_layout::{Domino, DominoConfig, NodeId, TableSource};
use domino_typed::{IdCategory, IdType, TypedGroupSet, TypedSet};

fn grid_cell(domino: &mut Domino, label: &str) -> NodeId {
    let sample = IdType::new("sample", IdCategory::new("sample"));
    let gene = IdType::new("gene", IdCategory::new("gene"));
    domino.create_node(
        TableSource::new(label)
            .with_rows(TypedGroupSet::create_ungrouped(TypedSet::from_ids([1, 2], sample)))
            .with_columns(TypedGroupSet::create_ungrouped(TypedSet::from_ids([7, 8, 9], gene))),
    )
}

#[test]
fn single_node_outline_is_its_bounds() {
    let mut domino = Domino::new();
    let a = grid_cell(&mut domino, "A");
    let block = domino.add_block(a, Point::new(5.0, 5.0)).unwrap();
    let outline = domino.outline(block).unwrap();
    assert_eq!(outline.len(), 4);
    let bounds = Rect::new(5.0, 5.0, 3.0, 2.0);
    for corner in bounds.corners() {
        assert!(outline.contains(&corner), "missing corner {corner:?}");
    }
}

#[test]
fn two_by_two_grid_has_four_corners() {
    let mut domino = Domino::new();
    let [a, b, c, d] = ["A", "B", "C", "D"].map(|l| grid_cell(&mut domino, l));
    let block = domino.add_block(a, Point::ZERO).unwrap();
    domino.add_node(block, a, Direction::East, b).unwrap();
    domino.add_node(block, a, Direction::South, c).unwrap();
    domino.add_node(block, c, Direction::East, d).unwrap();

    let outline = domino.outline(block).unwrap();
    assert_eq!(
        outline,
        vec![
            Point::new(6.0, 0.0),
            Point::new(6.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(0.0, 0.0),
        ]
    );
    assert_eq!(domino.block(block).unwrap().bounds(), Rect::new(0.0, 0.0, 6.0, 4.0));
}

#[test]
fn single_chain_uses_chain_bounds() {
    let mut domino = Domino::new();
    let [a, b, c] = ["A", "B", "C"].map(|l| grid_cell(&mut domino, l));
    let block = domino.add_block(a, Point::ZERO).unwrap();
    domino.add_node(block, a, Direction::East, b).unwrap();
    domino.add_node(block, b, Direction::East, c).unwrap();
    let outline = domino.outline(block).unwrap();
    assert_eq!(outline.len(), 4);
    assert!(outline.contains(&Point::new(9.0, 2.0)));
}

#[test]
fn l_shape_outline_bounded_by_config() {
    let mut domino = Domino::with_config(DominoConfig::default().with_outline_step_factor(4));
    let [a, b, c] = ["A", "B", "C"].map(|l| grid_cell(&mut domino, l));
    let block = domino.add_block(a, Point::ZERO).unwrap();
    domino.add_node(block, a, Direction::East, b).unwrap();
    domino.add_node(block, a, Direction::South, c).unwrap();
    let outline = domino.outline(block).unwrap();
    assert_eq!(outline.len(), 6);
    assert_eq!(outline[0], Point::new(6.0, 0.0));
    assert!(outline.contains(&Point::new(3.0, 2.0)));
}

#[test]
fn outline_from_east_end_of_lower_row() {
    // a
    // b c
    let mut domino = Domino::new();
    let [a, b, c] = ["A", "B", "C"].map(|l| grid_cell(&mut domino, l));
    let block = domino.add_block(c, Point::ZERO).unwrap();
    domino.add_node(block, c, Direction::West, b).unwrap();
    domino.add_node(block, b, Direction::North, a).unwrap();

    let outline = domino.outline(block).unwrap();
    assert_eq!(outline.len(), 6);
    for (i, p) in outline.iter().enumerate() {
        assert!(!outline[i + 1..].contains(p), "repeated corner {p:?}");
    }
    let bounds = domino.block(block).unwrap().bounds();
    assert_eq!((bounds.width, bounds.height), (6.0, 4.0));
    assert!(outline.contains(&bounds.corner(Direction::North)));
    assert!(outline.contains(&bounds.corner(Direction::South)));
    assert!(!outline.contains(&bounds.corner(Direction::East)));
}
