//! Property-based invariant tests for the canvas geometry primitives.
//!
//! 1. Intersection is commutative.
//! 2. Intersection result fits within both inputs.
//! 3. Union contains both inputs.
//! 4. Corners of a rect bound exactly the rect.
//! 5. Rect containment agrees with polygon containment of its corners.

use domino_core::geometry::{Point, Rect, polygon_contains};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=500, 0u16..=500, 1u16..=500, 1u16..=500)
        .prop_map(|(x, y, w, h)| Rect::new(x.into(), y.into(), w.into(), h.into()))
}

fn within(inner: &Rect, outer: &Rect) -> bool {
    inner.x >= outer.x
        && inner.y >= outer.y
        && inner.right() <= outer.right()
        && inner.bottom() <= outer.bottom()
}

proptest! {
    #[test]
    fn intersection_commutative(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection_opt(&b), b.intersection_opt(&a));
    }

    #[test]
    fn intersection_fits_inputs(a in rect_strategy(), b in rect_strategy()) {
        if let Some(i) = a.intersection_opt(&b) {
            prop_assert!(within(&i, &a), "{:?} not within {:?}", i, a);
            prop_assert!(within(&i, &b), "{:?} not within {:?}", i, b);
        }
    }

    #[test]
    fn union_contains_inputs(a in rect_strategy(), b in rect_strategy()) {
        let u = a.union(&b);
        prop_assert!(within(&a, &u));
        prop_assert!(within(&b, &u));
    }

    #[test]
    fn corners_bound_rect(a in rect_strategy()) {
        prop_assert_eq!(Rect::bounding(a.corners()), Some(a));
    }

    #[test]
    fn rect_and_polygon_agree(a in rect_strategy(), px in 0u16..=1000, py in 0u16..=1000) {
        // Half-cell offsets keep the sample point off the edges.
        let p = Point::new(f32::from(px) + 0.5, f32::from(py) + 0.5);
        prop_assert_eq!(a.contains(p), polygon_contains(&a.corners(), p));
    }
}
