//! Local/world conversions across the parent chain
//!
//! Nothing is cached: every query walks from the node up to its root, which
//! keeps live edits trivially consistent. Scene depth is small.

use crate::foundation::math::{utils, Vec3};

use super::{NodeId, SceneError, SceneGraph};

impl SceneGraph {
    /// Map a point in `id`'s local frame to world space
    pub fn world_point(&self, id: NodeId, local: Vec3) -> Result<Vec3, SceneError> {
        self.node(id)?;
        Ok(self
            .ancestors(id)
            .fold(local, |point, (_, node)| node.transform.apply_to_point(point)))
    }

    /// Map a world-space point into `id`'s local frame
    ///
    /// Exact inverse of [`SceneGraph::world_point`], except that near-zero scale
    /// components are treated as 1.
    pub fn local_point(&self, id: NodeId, world: Vec3) -> Result<Vec3, SceneError> {
        self.node(id)?;
        let chain: Vec<_> = self.ancestors(id).collect();
        Ok(chain
            .iter()
            .rev()
            .fold(world, |point, (_, node)| node.transform.apply_inverse_to_point(point)))
    }

    /// World position of the node's origin
    pub fn real_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        self.world_point(id, Vec3::zeros())
    }

    /// Sum of the Euler rotations of the node and all its ancestors
    pub fn real_rotation(&self, id: NodeId) -> Result<Vec3, SceneError> {
        self.node(id)?;
        Ok(self
            .ancestors(id)
            .fold(Vec3::zeros(), |sum, (_, node)| sum + node.transform.rotation))
    }

    /// Product of the scales of the node and all its ancestors
    pub fn world_scale(&self, id: NodeId) -> Result<Vec3, SceneError> {
        self.node(id)?;
        Ok(self
            .ancestors(id)
            .fold(Vec3::new(1.0, 1.0, 1.0), |product, (_, node)| {
                product.component_mul(&node.transform.scale)
            }))
    }

    /// Convert a world-space length along each axis into the node's local frame
    ///
    /// Lengths stay non-negative under mirroring scales.
    pub fn local_extent(&self, id: NodeId, world: Vec3) -> Result<Vec3, SceneError> {
        Ok(utils::safe_div(world, self.world_scale(id)?).abs())
    }

    /// Orbit the node about `pivot` and `axis` in its parent's frame
    ///
    /// Returns `Ok(false)` for a near-zero axis, leaving the node untouched.
    pub fn orbit(&mut self, id: NodeId, pivot: Vec3, axis: Vec3, angle_degrees: f32) -> Result<bool, SceneError> {
        Ok(self.node_mut(id)?.transform.orbit(pivot, axis, angle_degrees))
    }
}
