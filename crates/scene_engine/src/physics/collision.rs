//! Oriented-box collision for a first-person player
//!
//! The player is a vertical cylinder hanging below the eye point: `radius`
//! wide and `height` tall. Boxes are [`NodeKind::CollisionVolume`] leaves
//! tested in their own local frame, so they follow every rotation and scale
//! of their ancestors (a door's box swings with the door).

use crate::foundation::math::Vec3;
use crate::scene::{NodeId, NodeKind, SceneError, SceneGraph};

/// Player cylinder dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerShape {
    /// Horizontal radius
    pub radius: f32,
    /// Height from the feet to the eye
    pub height: f32,
}

impl PlayerShape {
    /// Create a player shape
    pub fn new(radius: f32, height: f32) -> Self {
        Self { radius, height }
    }
}

/// True if the player with its eye at `point` intersects the box `volume`
///
/// Nodes that are not collision volumes never overlap.
pub fn overlaps(
    graph: &SceneGraph,
    volume: NodeId,
    point: Vec3,
    player: PlayerShape,
) -> Result<bool, SceneError> {
    let Some(half) = graph.node(volume)?.kind().half_extents() else {
        return Ok(false);
    };

    let local = graph.local_point(volume, point)?;

    let extent = graph.local_extent(volume, Vec3::new(player.radius, player.height, player.radius))?;
    let radius = extent.x.max(extent.z);
    let height = extent.y;

    if local.x < -half.x - radius || local.x > half.x + radius {
        return Ok(false);
    }
    if local.z < -half.z - radius || local.z > half.z + radius {
        return Ok(false);
    }
    Ok(local.y - height < half.y && local.y > -half.y)
}

/// Flat list of nodes checked for collisions
///
/// Entries are collision volumes or composites that contain them. Entries
/// whose node was removed are skipped.
#[derive(Debug, Clone, Default)]
pub struct PhysicsRegistry {
    entries: Vec<NodeId>,
}

impl PhysicsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every collision volume currently in `graph`
    pub fn from_scene(graph: &SceneGraph) -> Self {
        let entries: Vec<NodeId> = graph
            .walk()
            .into_iter()
            .filter(|&id| {
                graph
                    .get(id)
                    .is_some_and(|node| matches!(node.kind(), NodeKind::CollisionVolume { .. }))
            })
            .collect();
        log::debug!("Physics registry collected {} collision volume(s)", entries.len());
        Self { entries }
    }

    /// Add a volume or a composite containing volumes
    pub fn register(&mut self, id: NodeId) {
        self.entries.push(id);
    }

    /// Registered entries
    pub fn entries(&self) -> &[NodeId] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First volume the player at `point` intersects, if any
    pub fn find_collision(&self, graph: &SceneGraph, point: Vec3, player: PlayerShape) -> Option<NodeId> {
        for &entry in &self.entries {
            let Some(node) = graph.get(entry) else {
                log::trace!("Skipping stale physics entry {:?}", entry);
                continue;
            };
            let hit = match node.kind() {
                NodeKind::CollisionVolume { .. } => test_volume(graph, entry, point, player),
                NodeKind::Composite(_) => graph
                    .collision_volumes_under(entry)
                    .into_iter()
                    .find(|&volume| test_volume(graph, volume, point, player).is_some()),
                _ => None,
            };
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    /// True if the player at `point` intersects any registered volume
    pub fn is_colliding(&self, graph: &SceneGraph, point: Vec3, player: PlayerShape) -> bool {
        self.find_collision(graph, point, player).is_some()
    }
}

fn test_volume(graph: &SceneGraph, volume: NodeId, point: Vec3, player: PlayerShape) -> Option<NodeId> {
    overlaps(graph, volume, point, player)
        .ok()
        .filter(|&hit| hit)
        .map(|_| volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    const PLAYER: PlayerShape = PlayerShape {
        radius: 0.3,
        height: 1.5,
    };

    #[test]
    fn test_point_inside_inflated_box() {
        let mut graph = SceneGraph::new();
        let volume = graph.add_root(Node::collision_volume(2.0, 2.0, 2.0));
        assert!(overlaps(&graph, volume, Vec3::new(0.5, 1.0, 0.0), PLAYER).unwrap());
        assert!(overlaps(&graph, volume, Vec3::new(1.25, 1.0, 0.0), PLAYER).unwrap());
        assert!(!overlaps(&graph, volume, Vec3::new(5.0, 1.0, 0.0), PLAYER).unwrap());
    }

    #[test]
    fn test_vertical_span() {
        let mut graph = SceneGraph::new();
        let volume = graph.add_root(Node::collision_volume(2.0, 2.0, 2.0));
        // Feet at 1.0 are above the box top
        assert!(!overlaps(&graph, volume, Vec3::new(0.0, 2.5, 0.0), PLAYER).unwrap());
        // Eye below the box bottom
        assert!(!overlaps(&graph, volume, Vec3::new(0.0, -1.0, 0.0), PLAYER).unwrap());
        assert!(overlaps(&graph, volume, Vec3::new(0.0, 2.4, 0.0), PLAYER).unwrap());
    }

    #[test]
    fn test_rotated_box_follows_orientation() {
        let mut graph = SceneGraph::new();
        // A long thin wall along X, turned to run along Z
        let wall = graph.add_root(
            Node::collision_volume(10.0, 3.0, 0.2).rotated(Vec3::new(0.0, 90.0, 0.0)),
        );
        assert!(overlaps(&graph, wall, Vec3::new(0.0, 1.5, 4.0), PLAYER).unwrap());
        assert!(!overlaps(&graph, wall, Vec3::new(4.0, 1.5, 0.0), PLAYER).unwrap());
    }

    #[test]
    fn test_scaled_box_uses_world_scale() {
        let mut graph = SceneGraph::new();
        let group = graph.add_root(Node::composite().scaled(Vec3::new(4.0, 1.0, 4.0)));
        let volume = graph.add_child(group, Node::collision_volume(1.0, 2.0, 1.0)).unwrap();
        // World half-width is 2, inflated by the 0.3 radius
        assert!(overlaps(&graph, volume, Vec3::new(2.2, 0.5, 0.0), PLAYER).unwrap());
        assert!(!overlaps(&graph, volume, Vec3::new(2.4, 0.5, 0.0), PLAYER).unwrap());
    }

    #[test]
    fn test_mirrored_box_matches_unmirrored() {
        let mut graph = SceneGraph::new();
        let group = graph.add_root(Node::composite().scaled(Vec3::new(-4.0, 1.0, 4.0)));
        let volume = graph.add_child(group, Node::collision_volume(1.0, 2.0, 1.0)).unwrap();
        assert!(overlaps(&graph, volume, Vec3::new(2.2, 0.5, 0.0), PLAYER).unwrap());
        assert!(overlaps(&graph, volume, Vec3::new(-2.2, 0.5, 0.0), PLAYER).unwrap());
        assert!(!overlaps(&graph, volume, Vec3::new(-2.4, 0.5, 0.0), PLAYER).unwrap());
    }

    #[test]
    fn test_non_volume_never_overlaps() {
        let mut graph = SceneGraph::new();
        let label = graph.add_root(Node::text("Sale"));
        assert!(!overlaps(&graph, label, Vec3::zeros(), PLAYER).unwrap());
    }

    #[test]
    fn test_registry_recurses_into_composites_and_skips_stale() {
        let mut graph = SceneGraph::new();
        let door = graph.add_root(Node::composite().at(Vec3::new(5.0, 0.0, 0.0)));
        let door_box = graph.add_child(door, Node::collision_volume(1.0, 2.0, 0.1)).unwrap();
        let crate_box = graph.add_root(Node::collision_volume(1.0, 1.0, 1.0).at(Vec3::new(-5.0, 0.5, 0.0)));

        let mut registry = PhysicsRegistry::new();
        registry.register(door);
        registry.register(crate_box);

        assert_eq!(registry.find_collision(&graph, Vec3::new(5.0, 1.5, 0.0), PLAYER), Some(door_box));
        assert!(registry.is_colliding(&graph, Vec3::new(-5.0, 1.5, 0.0), PLAYER));
        assert!(!registry.is_colliding(&graph, Vec3::new(0.0, 1.5, 0.0), PLAYER));

        graph.remove_subtree(door).unwrap();
        assert!(!registry.is_colliding(&graph, Vec3::new(5.0, 1.5, 0.0), PLAYER));
    }

    #[test]
    fn test_registry_from_scene_collects_nested_volumes() {
        let mut graph = SceneGraph::new();
        let room = graph.add_root(Node::composite());
        graph.add_child(room, Node::collision_volume(1.0, 1.0, 1.0)).unwrap();
        graph.add_root(Node::collision_volume(1.0, 1.0, 1.0));
        graph.add_root(Node::text("no"));
        assert_eq!(PhysicsRegistry::from_scene(&graph).len(), 2);
    }
}
