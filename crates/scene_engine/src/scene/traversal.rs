//! Whole-scene traversals
//!
//! All walks are depth-first, roots in insertion order and children in
//! insertion order, parents before their children.

use super::{NodeId, NodeKind, SceneGraph};

impl SceneGraph {
    /// Every node reachable from the root set, parents first
    pub fn walk(&self) -> Vec<NodeId> {
        self.roots()
            .iter()
            .flat_map(|&root| self.subtree(root))
            .collect()
    }

    /// Every non-composite node reachable from the root set
    pub fn leaves(&self) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|node| !node.kind().is_composite()))
            .collect()
    }

    /// Collision volumes at or below `id`
    pub fn collision_volumes_under(&self, id: NodeId) -> Vec<NodeId> {
        self.subtree(id)
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .is_some_and(|node| matches!(node.kind(), NodeKind::CollisionVolume { .. }))
            })
            .collect()
    }

    /// Run every node's animation for one frame
    ///
    /// Each node is ticked before its children, so children see their parent's
    /// new transform in the same frame.
    pub fn update(&mut self, delta_time: f32) -> usize {
        let order = self.walk();
        let mut animated = 0;
        for id in order {
            if let Some(node) = self.get_mut(id) {
                if node.animation.is_some() {
                    node.tick(delta_time);
                    animated += 1;
                }
            }
        }
        animated
    }
}
