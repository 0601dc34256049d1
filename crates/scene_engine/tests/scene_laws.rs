//! Transform, collision and shadow laws checked over grids of inputs

use approx::{assert_abs_diff_eq, assert_relative_eq};
use scene_engine::foundation::math::{Vec3, Vec4};
use scene_engine::physics::{overlaps, PlayerShape};
use scene_engine::render::shadow_matrix;
use scene_engine::scene::{Node, NodeId, Primitive, SceneGraph};

fn sample_points() -> Vec<Vec3> {
    vec![
        Vec3::zeros(),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-2.5, 3.0, 0.75),
        Vec3::new(0.1, -4.0, 9.0),
    ]
}

/// A chain of `depth + 1` nodes with mixed transforms; returns the deepest
fn chain(graph: &mut SceneGraph, depth: usize) -> NodeId {
    let mut id = graph.add_root(
        Node::composite()
            .at(Vec3::new(2.0, -1.0, 3.0))
            .rotated(Vec3::new(15.0, 30.0, -45.0))
            .scaled(Vec3::new(1.5, 0.5, 2.0)),
    );
    for level in 0..depth {
        let f = level as f32 + 1.0;
        let node = Node::composite()
            .at(Vec3::new(f, 0.5 * f, -f))
            .rotated(Vec3::new(10.0 * f, -20.0 * f, 35.0))
            .scaled(Vec3::new(1.0 + 0.1 * f, 0.8, 1.2));
        id = graph.add_child(id, node).unwrap();
    }
    id
}

#[test]
fn round_trip_at_every_depth() {
    for depth in 0..=4 {
        let mut graph = SceneGraph::new();
        let deepest = chain(&mut graph, depth);
        assert_eq!(graph.depth(deepest).unwrap(), depth);
        for p in sample_points() {
            let world = graph.world_point(deepest, p).unwrap();
            let back = graph.local_point(deepest, world).unwrap();
            assert_relative_eq!(back, p, epsilon = 1e-3);
        }
    }
}

#[test]
fn orbit_preserves_distance_to_pivot() {
    let axes = [
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-0.3, 0.2, 5.0),
    ];
    let pivot = Vec3::new(1.0, 2.0, -1.0);
    for axis in axes {
        for angle in [-170.0, -45.0, 0.5, 90.0, 359.0] {
            let mut graph = SceneGraph::new();
            let id = graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(4.0, -1.0, 2.0)));
            let before = (graph.real_position(id).unwrap() - pivot).norm();
            assert!(graph.orbit(id, pivot, axis, angle).unwrap());
            let after = (graph.real_position(id).unwrap() - pivot).norm();
            assert_relative_eq!(before, after, epsilon = 1e-4);
        }
    }
}

#[test]
fn orbit_about_zero_axis_is_ignored() {
    let mut graph = SceneGraph::new();
    let id = graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(4.0, 0.0, 0.0)));
    assert!(!graph.orbit(id, Vec3::zeros(), Vec3::zeros(), 90.0).unwrap());
    assert_eq!(graph.real_position(id).unwrap(), Vec3::new(4.0, 0.0, 0.0));
}

#[test]
fn box_overlap_scenarios() {
    let mut graph = SceneGraph::new();
    let volume = graph.add_root(Node::collision_volume(2.0, 2.0, 2.0));
    let player = PlayerShape::new(0.3, 1.5);

    assert!(overlaps(&graph, volume, Vec3::new(0.5, 1.0, 0.0), player).unwrap());
    assert!(!overlaps(&graph, volume, Vec3::new(5.0, 1.0, 0.0), player).unwrap());
    // Inflated by the radius: 1.25 is inside 1.3, 1.35 is not
    assert!(overlaps(&graph, volume, Vec3::new(1.25, 1.0, 0.0), player).unwrap());
    assert!(!overlaps(&graph, volume, Vec3::new(1.35, 1.0, 0.0), player).unwrap());
}

#[test]
fn overlap_is_translation_invariant() {
    let queries = [
        Vec3::new(0.5, 1.0, 0.0),
        Vec3::new(5.0, 1.0, 0.0),
        Vec3::new(1.2, 2.2, -0.9),
        Vec3::new(0.0, -1.2, 0.0),
        Vec3::new(-0.4, 3.0, 0.3),
    ];
    let shifts = [
        Vec3::zeros(),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(-3.5, 7.25, 2.0),
    ];
    let player = PlayerShape::new(0.3, 1.5);

    for rotation in [Vec3::zeros(), Vec3::new(0.0, 35.0, 0.0)] {
        let mut base = SceneGraph::new();
        let origin_box = base.add_root(Node::collision_volume(2.0, 2.0, 2.0).rotated(rotation));
        for shift in shifts {
            let mut moved = SceneGraph::new();
            let shifted_box = moved.add_root(Node::collision_volume(2.0, 2.0, 2.0).at(shift).rotated(rotation));
            for q in queries {
                assert_eq!(
                    overlaps(&base, origin_box, q, player).unwrap(),
                    overlaps(&moved, shifted_box, q + shift, player).unwrap(),
                    "query {q:?} shifted by {shift:?}"
                );
            }
        }
    }
}

#[test]
fn shadow_matrix_flattens_once() {
    let light = Vec4::new(1.0, 1.0, 1.0, 0.0);
    let plane = Vec4::new(0.0, 1.0, 0.0, 0.0);
    let m = shadow_matrix(light, plane);
    assert_abs_diff_eq!(m.determinant(), 0.0, epsilon = 1e-5);
    for p in sample_points() {
        let once = m.transform_point(&p.into());
        let twice = m.transform_point(&once);
        assert_relative_eq!(once, twice, epsilon = 1e-4);
        assert_abs_diff_eq!(once.y, 0.0, epsilon = 1e-5);
    }
}
