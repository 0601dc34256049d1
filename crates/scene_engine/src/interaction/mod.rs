//! Ray-cast interaction with event bubbling
//!
//! A ray from the viewer picks the nearest leaf whose world position lies
//! within a fixed radius of the ray. The interaction is then offered to that
//! leaf and, if it has no handler, to each ancestor in turn; the first node
//! with a handler consumes it.

use crate::core::config::InteractionConfig;
use crate::foundation::math::Vec3;
use crate::scene::{InteractionContext, NodeId, SceneError, SceneGraph};

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalising `direction`; `None` for a zero direction
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the point closest to `point`
    pub fn closest_approach(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(&self.direction)
    }
}

/// A leaf picked by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The leaf that was hit
    pub node: NodeId,
    /// Distance along the ray to the closest approach
    pub distance: f32,
}

/// Nearest leaf within `config.hit_radius` of the ray and closer than
/// `config.max_distance` along it
pub fn find_target(graph: &SceneGraph, ray: &Ray, config: &InteractionConfig) -> Option<RayHit> {
    let radius_sq = config.hit_radius * config.hit_radius;
    let mut best: Option<RayHit> = None;
    let mut best_distance = config.max_distance;

    for leaf in graph.leaves() {
        let Ok(position) = graph.real_position(leaf) else {
            continue;
        };
        let t = ray.closest_approach(position);
        if t <= 0.0 || t >= best_distance {
            continue;
        }
        if (position - ray.point_at(t)).norm_squared() < radius_sq {
            best_distance = t;
            best = Some(RayHit { node: leaf, distance: t });
        }
    }
    best
}

/// Offer an interaction to `target`, bubbling towards the root
///
/// Returns the node whose handler ran, or `None` if no node on the chain has
/// one.
pub fn interact(graph: &mut SceneGraph, target: NodeId, viewer_position: Vec3) -> Result<Option<NodeId>, SceneError> {
    graph.node(target)?;
    let handler = graph
        .ancestors(target)
        .find(|(_, node)| node.interaction.is_some())
        .map(|(id, _)| id);

    let Some(handler) = handler else {
        log::debug!("Interaction with {:?} reached the root unhandled", target);
        return Ok(None);
    };

    let context = InteractionContext {
        viewer_position,
        node_position: graph.real_position(handler)?,
        node_rotation: graph.real_rotation(handler)?,
    };
    graph.node_mut(handler)?.handle_interaction(&context);
    log::debug!("Interaction with {:?} handled by {:?}", target, handler);
    Ok(Some(handler))
}

/// Cast a ray and interact with whatever it picks
pub fn cast(
    graph: &mut SceneGraph,
    origin: Vec3,
    direction: Vec3,
    config: &InteractionConfig,
) -> Result<Option<NodeId>, SceneError> {
    let Some(ray) = Ray::new(origin, direction) else {
        return Ok(None);
    };
    let Some(hit) = find_target(graph, &ray, config) else {
        return Ok(None);
    };
    log::debug!("Ray hit {:?} at distance {:.2}", hit.node, hit.distance);
    interact(graph, hit.node, origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Animation, InteractionHandler, Node, Primitive, SwingState};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_handler(counter: &Rc<Cell<u32>>) -> InteractionHandler {
        let counter = Rc::clone(counter);
        InteractionHandler::Custom(Rc::new(move |_, _| counter.set(counter.get() + 1)))
    }

    #[test]
    fn test_nearest_leaf_wins() {
        let mut graph = SceneGraph::new();
        let far = graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(0.0, 0.0, -6.0)));
        let near = graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(0.5, 0.0, -3.0)));
        graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(0.0, 0.0, 2.0)));
        graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(4.0, 0.0, -1.0)));

        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -2.0)).unwrap();
        let config = InteractionConfig::default();
        let hit = find_target(&graph, &ray, &config).unwrap();
        assert_eq!(hit.node, near);

        graph.remove_subtree(near).unwrap();
        assert_eq!(find_target(&graph, &ray, &config).unwrap().node, far);
    }

    #[test]
    fn test_out_of_reach() {
        let mut graph = SceneGraph::new();
        graph.add_root(Node::primitive(Primitive::Cube).at(Vec3::new(0.0, 0.0, -12.0)));
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(find_target(&graph, &ray, &InteractionConfig::default()).is_none());
        assert!(Ray::new(Vec3::zeros(), Vec3::zeros()).is_none());
    }

    #[test]
    fn test_bubbles_to_first_handler() {
        let root_count = Rc::new(Cell::new(0));
        let mut graph = SceneGraph::new();
        let root = graph.add_root(Node::composite().with_interaction(counting_handler(&root_count)));
        let mid = graph.add_child(root, Node::composite()).unwrap();
        let leaf = graph.add_child(mid, Node::primitive(Primitive::Cube)).unwrap();

        assert_eq!(interact(&mut graph, leaf, Vec3::zeros()).unwrap(), Some(root));
        assert_eq!(root_count.get(), 1);
    }

    #[test]
    fn test_unhandled_is_silent() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(Node::composite());
        let leaf = graph.add_child(root, Node::text("Exit")).unwrap();
        assert_eq!(interact(&mut graph, leaf, Vec3::zeros()).unwrap(), None);
    }

    #[test]
    fn test_door_toggle() {
        let mut graph = SceneGraph::new();
        let door = graph.add_root(
            Node::primitive(Primitive::Cube)
                .at(Vec3::new(0.0, 1.0, 0.0))
                .with_animation(Animation::Swing(SwingState::new(Vec3::new(-0.5, 1.0, 0.0), 1.0)))
                .with_interaction(InteractionHandler::ToggleSwing),
        );
        let viewer = Vec3::new(0.0, 1.5, 4.0);

        interact(&mut graph, door, viewer).unwrap();
        assert_eq!(graph.node(door).unwrap().swing().unwrap().target, 90.0);

        interact(&mut graph, door, viewer).unwrap();
        assert_eq!(graph.node(door).unwrap().swing().unwrap().target, 0.0);
    }

    #[test]
    fn test_cast_dispatches() {
        let count = Rc::new(Cell::new(0));
        let mut graph = SceneGraph::new();
        let sign = graph.add_root(Node::composite().with_interaction(counting_handler(&count)));
        graph
            .add_child(sign, Node::text("Push").at(Vec3::new(0.0, 1.0, -3.0)))
            .unwrap();

        let handled = cast(
            &mut graph,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            &InteractionConfig::default(),
        )
        .unwrap();
        assert_eq!(handled, Some(sign));
        assert_eq!(count.get(), 1);
    }
}
