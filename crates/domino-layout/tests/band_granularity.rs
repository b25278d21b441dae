//! Band granularity between two blocks.

use domino_core::{Axis, Point, Rect, Rgb};
use domino_layout::{BandMode, Domino, NodeId, Side, TableSource};
use domino_typed::{IdCategory, IdType, TypedGroupSet, TypedSet, TypedSetGroup};

fn tag() -> IdType {
    IdType::new("sample", IdCategory::new("sample"))
}

fn set(ids: &[u32]) -> TypedSet {
    TypedSet::from_ids(ids.iter().copied(), tag())
}

fn three_groups() -> TypedGroupSet {
    TypedGroupSet::new(
        set(&[1, 2, 3, 4, 5, 6]),
        vec![
            TypedSetGroup::new(set(&[1, 2]), "x", Rgb::RED),
            TypedSetGroup::new(set(&[3, 4]), "y", Rgb::RED),
            TypedSetGroup::new(set(&[5, 6]), "z", Rgb::RED),
        ],
    )
}

fn setup(left: TableSource, right: TableSource) -> (Domino, NodeId, NodeId, String) {
    let mut domino = Domino::new();
    let a = domino.create_node(left);
    let b = domino.create_node(right);
    let _ = domino.add_block(a, Point::ZERO).unwrap();
    let _ = domino.add_block(b, Point::new(50.0, 0.0)).unwrap();
    let id = format!("{}X{}", a.get(), b.get());
    (domino, a, b, id)
}

#[test]
fn grouped_band_without_detail_cannot_increase() {
    let (mut domino, _, _, id) = setup(
        TableSource::new("A").with_rows(three_groups()),
        TableSource::new("B")
            .with_rows(TypedGroupSet::create_ungrouped(set(&[1, 2, 3, 4, 5, 6])))
            .without_detail(Axis::Vertical),
    );
    let band = domino.band_mut(&id).unwrap();
    assert_eq!(band.mode(), BandMode::Groups);
    assert!(!band.can_have_detail());
    assert!(!band.increase());
    assert_eq!(band.mode(), BandMode::Groups);
    assert_eq!(band.routes().len(), 3);
    assert_eq!(band.label_of(1), "y x ");
}

#[test]
fn grouped_band_with_detail_reaches_detail() {
    let (mut domino, _, _, id) = setup(
        TableSource::new("A").with_rows(three_groups()),
        TableSource::new("B").with_rows(TypedGroupSet::create_ungrouped(set(&[2, 3, 4, 9]))),
    );
    let band = domino.band_mut(&id).unwrap();
    assert_eq!(band.mode(), BandMode::Groups);
    // x shares {2}, y shares {3, 4}, z shares nothing.
    assert_eq!(band.routes().len(), 2);
    assert!(band.increase());
    assert_eq!(band.mode(), BandMode::Detail);
    assert_eq!(band.routes().len(), 3);
    assert!(!band.increase());
    assert!(band.decrease());
    assert!(band.decrease());
    assert!(!band.decrease());
    assert_eq!(band.ids(Side::Source, 0).len(), 3);
}

#[test]
fn ungrouped_detail_sides_start_at_detail() {
    let (domino, _, _, id) = setup(
        TableSource::new("A").with_rows(TypedGroupSet::create_ungrouped(set(&[1, 2, 3]))),
        TableSource::new("B").with_rows(TypedGroupSet::create_ungrouped(set(&[3, 4]))),
    );
    let band = domino.band(&id).unwrap();
    assert_eq!(band.mode(), BandMode::Detail);
    assert_eq!(band.label(), "A x B");
}

#[test]
fn intersecting_ids_follow_active_mode() {
    let (mut domino, _, _, id) = setup(
        TableSource::new("A").with_rows(three_groups()),
        TableSource::new("B").with_rows(TypedGroupSet::create_ungrouped(set(&[1, 2, 3, 4, 5, 6]))),
    );
    let region = Rect::new(0.0, 0.0, 1.0, 1.5);
    let band = domino.band(&id).unwrap();
    let (source, target) = band.intersecting_ids(&region);
    assert_eq!(source.iter().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(target.iter().collect::<Vec<_>>(), vec![1, 2]);

    assert!(domino.band_mut(&id).unwrap().decrease());
    let (source, _) = domino.band(&id).unwrap().intersecting_ids(&region);
    assert_eq!(source.len(), 6);

    let far = Rect::new(500.0, 500.0, 1.0, 1.0);
    assert!(domino.band(&id).unwrap().intersecting_ids(&far).0.is_empty());
}
