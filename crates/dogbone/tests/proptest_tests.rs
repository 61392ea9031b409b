//! Property-based tests for corner finding and clearance boxes.

use std::collections::HashSet;
use std::f64::consts::{PI, TAU};

use proptest::prelude::*;

use dogbone::{angle_between_faces, dogbone_tool, find_inner_corners, ToolParameters, MIN_BOX_LENGTH};
use dogbone_kernel::geometry::point::Point2d;
use dogbone_kernel::geometry::vector::Vec3;
use dogbone_kernel::topology::brep::{EntityStore, FaceId};
use dogbone_kernel::topology::primitives::{extrude_profile, Profile};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 20x20 plate with a regular `sides`-gon pocket through it. Returns the
/// top face.
fn polygon_pocket(store: &mut EntityStore, sides: usize, radius: f64, phase: f64, height: f64) -> FaceId {
    let hole = (0..sides)
        .map(|k| {
            let a = phase + TAU * k as f64 / sides as f64;
            Point2d::new(10.0 + radius * a.cos(), 10.0 + radius * a.sin())
        })
        .collect();
    let profile = Profile::rectangle(0.0, 0.0, 20.0, 20.0).with_hole(hole);
    let solid = extrude_profile(store, &profile, 0.0, height).unwrap();
    store
        .solid_faces(solid)
        .into_iter()
        .find(|&f| (store.face_normal(f, 0.0, 0.0) - Vec3::Z).length() < 1e-12)
        .unwrap()
}

// ---------------------------------------------------------------------------
// 1. Corner count is bounded by the boundary vertices, edges are distinct
//    and every angle lies strictly inside the window
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn corners_bounded_distinct_and_in_window(
        sides in 3usize..12,
        radius in 2.0f64..8.0,
        phase in 0.0f64..TAU,
        height in 0.5f64..10.0,
        min_deg in 0.5f64..30.0,
        max_deg in 100.0f64..179.5,
    ) {
        let mut store = EntityStore::new();
        let top = polygon_pocket(&mut store, sides, radius, phase, height);
        let (min, max) = (min_deg.to_radians(), max_deg.to_radians());

        let corners = find_inner_corners(&store, top, min, max);
        let boundary_vertices = store.face_vertices(top).len();
        prop_assert!(corners.len() <= boundary_vertices);

        let distinct: HashSet<_> = corners.iter().map(|c| c.edge).collect();
        prop_assert_eq!(distinct.len(), corners.len());

        for c in &corners {
            let angle = angle_between_faces(&store, c.edge).unwrap();
            prop_assert!(min < angle && angle < max);
            prop_assert!(store.face_contains_vertex(top, c.vertex));
        }

        // Pocket corners sit at the polygon's interior angle.
        let interior = PI * (sides as f64 - 2.0) / sides as f64;
        let expected = if min < interior && interior < max { sides } else { 0 };
        prop_assert_eq!(corners.len(), expected);
    }
}

// ---------------------------------------------------------------------------
// 2. In a 60 degree corner, more slack gives a strictly longer box
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn box_length_grows_with_slack(
        diameter in 0.05f64..1.0,
        low in 0.0f64..50.0,
        step in 0.5f64..50.0,
        phase in 0.0f64..TAU,
    ) {
        let mut store = EntityStore::new();
        let top = polygon_pocket(&mut store, 3, 5.0, phase, 2.0);
        let corners = find_inner_corners(&store, top, 1.0_f64.to_radians(), 179.0_f64.to_radians());
        prop_assert_eq!(corners.len(), 3);

        let tight = ToolParameters::minimal(diameter, low);
        let loose = ToolParameters::minimal(diameter, low + step);
        prop_assert!(loose.min_percent() > tight.min_percent());

        for corner in &corners {
            let a = dogbone_tool(&store, corner, &tight, None).unwrap().clearance_box.unwrap();
            let b = dogbone_tool(&store, corner, &loose, None).unwrap().clearance_box.unwrap();
            prop_assert!(a.length > MIN_BOX_LENGTH);
            prop_assert!(b.length > a.length);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. The box never collapses below the floor; obtuse corners sit on it
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn box_length_never_below_floor(
        sides in 3usize..10,
        diameter in 0.01f64..2.0,
        percent in 0.0f64..100.0,
        phase in 0.0f64..TAU,
    ) {
        let mut store = EntityStore::new();
        let top = polygon_pocket(&mut store, sides, 4.0, phase, 3.0);
        let params = ToolParameters::minimal(diameter, percent);
        let corners = find_inner_corners(&store, top, params.min_angle_limit, params.max_angle_limit);

        for corner in &corners {
            let tool = dogbone_tool(&store, corner, &params, None).unwrap();
            let b = tool.clearance_box.unwrap();
            prop_assert!(b.length >= MIN_BOX_LENGTH);
            prop_assert!((b.width - diameter).abs() < 1e-12);
            if sides >= 6 {
                // At 120 degrees and wider, r * k / tan(a/2) - r <= 0 for k < 1.73.
                if params.min_percent() < 1.7 {
                    prop_assert_eq!(b.length, MIN_BOX_LENGTH);
                }
            }
        }
    }
}
