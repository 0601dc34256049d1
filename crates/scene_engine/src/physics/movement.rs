//! Player movement resolution
//!
//! Gravity is integrated first and corrected by a single collision test.
//! Walking is then resolved one axis at a time: X is committed only if it
//! does not collide, then Z on its own, which lets the player slide along
//! walls without computing a slide vector.

use crate::core::config::PhysicsConfig;
use crate::foundation::math::utils;
use crate::input::{MovementIntent, Viewer};
use crate::scene::SceneGraph;

use super::collision::{PhysicsRegistry, PlayerShape};

/// What happened during one movement step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementOutcome {
    /// The eye was clamped to the ground height
    pub grounded: bool,
    /// The vertical step hit a box and was undone
    pub vertical_blocked: bool,
    /// The X step was rejected
    pub blocked_x: bool,
    /// The Z step was rejected
    pub blocked_z: bool,
}

/// Kinematic first-person body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerController {
    config: PhysicsConfig,
    vertical_velocity: f32,
}

impl PlayerController {
    /// Create a controller at rest
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            vertical_velocity: 0.0,
        }
    }

    /// Player cylinder used for collision tests
    pub fn shape(&self) -> PlayerShape {
        PlayerShape::new(self.config.player_radius, self.config.player_height)
    }

    /// Current vertical speed
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Physics parameters
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Move the viewer for one frame
    pub fn step(
        &mut self,
        viewer: &mut Viewer,
        intent: MovementIntent,
        graph: &SceneGraph,
        registry: &PhysicsRegistry,
        delta_time: f32,
    ) -> MovementOutcome {
        let mut outcome = MovementOutcome::default();
        let shape = self.shape();

        self.vertical_velocity -= self.config.gravity * delta_time;
        viewer.position.y += self.vertical_velocity * delta_time;

        if viewer.position.y < self.config.player_height {
            viewer.position.y = self.config.player_height;
            self.vertical_velocity = 0.0;
            outcome.grounded = true;
        }

        // Landing on a box or bumping a head both undo the step
        if registry.is_colliding(graph, viewer.position, shape) {
            viewer.position.y -= self.vertical_velocity * delta_time;
            self.vertical_velocity = 0.0;
            outcome.vertical_blocked = true;
        }

        let (forward, strafe) = intent.walk_axes();
        if forward != 0.0 || strafe != 0.0 {
            let distance = self.config.walk_speed * delta_time;
            let (sin, cos) = utils::deg_to_rad(viewer.yaw).sin_cos();
            let ex = forward * distance;
            let ez = strafe * distance;
            let dx = ex * cos - ez * sin;
            let dz = ex * sin + ez * cos;

            let mut next = viewer.position;
            next.x += dx;
            if registry.is_colliding(graph, next, shape) {
                outcome.blocked_x = true;
            } else {
                viewer.position.x = next.x;
            }

            let mut next = viewer.position;
            next.z += dz;
            if registry.is_colliding(graph, next, shape) {
                outcome.blocked_z = true;
            } else {
                viewer.position.z = next.z;
            }
        }

        if intent.contains(MovementIntent::JUMP) {
            self.vertical_velocity = self.config.jump_velocity;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::Node;
    use approx::assert_relative_eq;

    fn standing_viewer() -> Viewer {
        Viewer {
            position: Vec3::new(0.0, 1.5, 0.0),
            ..Viewer::default()
        }
    }

    #[test]
    fn test_gravity_is_clamped_at_ground() {
        let graph = SceneGraph::new();
        let registry = PhysicsRegistry::new();
        let mut controller = PlayerController::new(PhysicsConfig::default());
        let mut viewer = Viewer {
            position: Vec3::new(0.0, 3.0, 0.0),
            ..Viewer::default()
        };

        for _ in 0..200 {
            controller.step(&mut viewer, MovementIntent::empty(), &graph, &registry, 1.0 / 60.0);
        }
        assert_relative_eq!(viewer.position.y, 1.5);
        assert_eq!(controller.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_forward_walks_along_yaw() {
        let graph = SceneGraph::new();
        let registry = PhysicsRegistry::new();
        let mut controller = PlayerController::new(PhysicsConfig::default());
        let mut viewer = standing_viewer();

        controller.step(&mut viewer, MovementIntent::FORWARD, &graph, &registry, 0.5);
        // Yaw -90 looks down -Z
        assert_relative_eq!(viewer.position, Vec3::new(0.0, 1.5, -3.0), epsilon = 1e-5);

        controller.step(&mut viewer, MovementIntent::RIGHT, &graph, &registry, 0.5);
        assert_relative_eq!(viewer.position, Vec3::new(3.0, 1.5, -3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_wall_slides_per_axis() {
        let mut graph = SceneGraph::new();
        // Wall across -Z in front of the player
        graph.add_root(Node::collision_volume(10.0, 3.0, 0.2).at(Vec3::new(0.0, 1.5, -0.5)));
        let registry = PhysicsRegistry::from_scene(&graph);
        let mut controller = PlayerController::new(PhysicsConfig::default());
        let mut viewer = Viewer {
            yaw: -45.0,
            ..standing_viewer()
        };

        let outcome = controller.step(&mut viewer, MovementIntent::FORWARD, &graph, &registry, 0.1);
        assert!(!outcome.blocked_x);
        assert!(outcome.blocked_z);
        assert!(viewer.position.x > 0.4);
        assert_eq!(viewer.position.z, 0.0);
    }

    #[test]
    fn test_jump_sets_vertical_velocity() {
        let graph = SceneGraph::new();
        let registry = PhysicsRegistry::new();
        let mut controller = PlayerController::new(PhysicsConfig::default());
        let mut viewer = standing_viewer();

        controller.step(&mut viewer, MovementIntent::JUMP, &graph, &registry, 1.0 / 60.0);
        assert_eq!(controller.vertical_velocity(), 5.0);
        controller.step(&mut viewer, MovementIntent::empty(), &graph, &registry, 1.0 / 60.0);
        assert!(viewer.position.y > 1.5);
    }

    #[test]
    fn test_head_bump_undoes_vertical_step() {
        let mut graph = SceneGraph::new();
        // Low ceiling slab whose underside sits at 2.0
        graph.add_root(Node::collision_volume(4.0, 0.2, 4.0).at(Vec3::new(0.0, 2.1, 0.0)));
        let registry = PhysicsRegistry::from_scene(&graph);
        let mut controller = PlayerController::new(PhysicsConfig::default());
        let mut viewer = standing_viewer();
        viewer.position.y = 1.9;

        controller.step(&mut viewer, MovementIntent::JUMP, &graph, &registry, 0.01);
        let outcome = controller.step(&mut viewer, MovementIntent::empty(), &graph, &registry, 0.1);
        assert!(outcome.vertical_blocked);
        assert_eq!(controller.vertical_velocity(), 0.0);
        assert!(viewer.position.y < 2.0);
    }
}
