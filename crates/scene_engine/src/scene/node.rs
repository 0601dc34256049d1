//! Scene nodes
//!
//! A node is a local transform plus appearance, an optional per-frame
//! animation and an optional interaction handler. What a node *is* lives in
//! the closed [`NodeKind`] variant; every traversal pattern-matches on it.

use std::fmt;
use std::rc::Rc;

use crate::assets::ImportedModel;
use crate::foundation::math::{Transform, Vec3};
use crate::render::Material;

use super::NodeId;

/// Built-in primitive shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Unit cube centred on the origin
    Cube,
    /// Cylinder of radius 0.5 and height 1 along +Z
    Cylinder,
    /// Floor plane spanning [-1, 1] on X and Z
    Plane,
}

/// Ordered child list of a composite node
///
/// Only the scene graph can fill it, which keeps every node under a single owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub(crate) Vec<NodeId>);

impl Children {
    /// Child ids in insertion order
    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no children
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A built-in shape
    Primitive(Primitive),
    /// Geometry loaded from disk, shared between clones
    ImportedMesh(Rc<ImportedModel>),
    /// Invisible box used by the collision engine
    CollisionVolume {
        /// Full size along local X
        width: f32,
        /// Full size along local Y
        height: f32,
        /// Full size along local Z
        depth: f32,
    },
    /// A line of text
    TextLabel(String),
    /// A group owning an ordered set of children
    Composite(Children),
}

impl NodeKind {
    /// True for composite nodes
    pub fn is_composite(&self) -> bool {
        matches!(self, NodeKind::Composite(_))
    }

    /// Box half-extents for collision volumes
    pub fn half_extents(&self) -> Option<Vec3> {
        match *self {
            NodeKind::CollisionVolume { width, height, depth } => {
                Some(Vec3::new(width, height, depth) * 0.5)
            }
            _ => None,
        }
    }
}

/// Swing state of a hinged node (doors)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingState {
    /// Hinge position in the parent frame
    pub pivot: Vec3,
    /// Hinge axis
    pub axis: Vec3,
    /// Angular speed in degrees per second
    pub speed: f32,
    /// Current swing angle in degrees
    pub current: f32,
    /// Angle the swing is heading to
    pub target: f32,
    /// +1 or -1; mirrors the opening direction of paired doors
    pub open_sign: f32,
}

impl SwingState {
    /// Default swing speed in degrees per second
    pub const DEFAULT_SPEED: f32 = 120.0;

    /// Remaining differences below this snap straight to the target
    pub const SNAP_THRESHOLD: f32 = 1.0;

    /// Closed swing around a vertical hinge
    pub fn new(pivot: Vec3, open_sign: f32) -> Self {
        Self {
            pivot,
            axis: Vec3::new(0.0, 1.0, 0.0),
            speed: Self::DEFAULT_SPEED,
            current: 0.0,
            target: 0.0,
            open_sign,
        }
    }

    /// True while the swing is open or opening
    pub fn is_open(&self) -> bool {
        self.target.abs() > Self::SNAP_THRESHOLD
    }

    /// Flip between closed and open.
    ///
    /// An open (or opening) swing closes. A closed one opens away from the
    /// viewer: `facing` is the node's forward direction on the ground plane and
    /// `offset` the viewer position relative to the node.
    pub fn toggle(&mut self, offset: Vec3, facing_yaw_degrees: f32) {
        if self.is_open() {
            self.target = 0.0;
            return;
        }
        let yaw = facing_yaw_degrees.to_radians();
        let side = offset.x * yaw.sin() + offset.z * yaw.cos();
        let direction = if side > 0.0 { 90.0 } else { -90.0 };
        self.target = direction * self.open_sign;
    }

    /// Advance towards the target, orbiting `transform` about the hinge
    pub fn advance(&mut self, transform: &mut Transform, delta_time: f32) {
        let diff = self.target - self.current;
        if diff == 0.0 {
            return;
        }
        if diff.abs() < Self::SNAP_THRESHOLD {
            transform.orbit(self.pivot, self.axis, diff);
            self.current = self.target;
            return;
        }
        let step = (self.speed * delta_time).min(diff.abs()).copysign(diff);
        transform.orbit(self.pivot, self.axis, step);
        self.current += step;
    }
}

/// Per-frame behaviour of a node
#[derive(Clone)]
pub enum Animation {
    /// Orbit about the node's own position
    Spin {
        /// Spin axis
        axis: Vec3,
        /// Angular speed
        degrees_per_second: f32,
    },
    /// Orbit about a fixed pivot in the parent frame
    Orbit {
        /// Orbit centre
        pivot: Vec3,
        /// Orbit axis
        axis: Vec3,
        /// Angular speed
        degrees_per_second: f32,
    },
    /// Hinged swing driven by interaction
    Swing(SwingState),
    /// Arbitrary closure over the node's own transform
    Custom(Rc<dyn Fn(&mut Transform, f32)>),
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Animation::Spin { axis, degrees_per_second } => f
                .debug_struct("Spin")
                .field("axis", axis)
                .field("degrees_per_second", degrees_per_second)
                .finish(),
            Animation::Orbit { pivot, axis, degrees_per_second } => f
                .debug_struct("Orbit")
                .field("pivot", pivot)
                .field("axis", axis)
                .field("degrees_per_second", degrees_per_second)
                .finish(),
            Animation::Swing(state) => f.debug_tuple("Swing").field(state).finish(),
            Animation::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Animation {
    /// Apply one frame of this animation
    pub fn apply(&mut self, transform: &mut Transform, delta_time: f32) {
        match self {
            Animation::Spin { axis, degrees_per_second } => {
                let pivot = transform.position;
                transform.orbit(pivot, *axis, *degrees_per_second * delta_time);
            }
            Animation::Orbit { pivot, axis, degrees_per_second } => {
                transform.orbit(*pivot, *axis, *degrees_per_second * delta_time);
            }
            Animation::Swing(state) => state.advance(transform, delta_time),
            Animation::Custom(behaviour) => behaviour(transform, delta_time),
        }
    }
}

/// What the interacting viewer looks like to a handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionContext {
    /// Viewer position in world space
    pub viewer_position: Vec3,
    /// World position of the handling node
    pub node_position: Vec3,
    /// Accumulated world rotation of the handling node
    pub node_rotation: Vec3,
}

/// Reaction of a node to an interaction
#[derive(Clone)]
pub enum InteractionHandler {
    /// Open or close the node's [`Animation::Swing`]
    ToggleSwing,
    /// Arbitrary closure over the node itself
    Custom(Rc<dyn Fn(&mut Node, &InteractionContext)>),
}

impl fmt::Debug for InteractionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionHandler::ToggleSwing => f.write_str("ToggleSwing"),
            InteractionHandler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A node of the scene graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Local transform relative to the parent
    pub transform: Transform,
    /// Appearance
    pub material: Material,
    /// Whether the node is flattened into the planar shadow
    pub casts_shadow: bool,
    /// Per-frame behaviour
    pub animation: Option<Animation>,
    /// Interaction reaction; unhandled interactions bubble to the parent
    pub interaction: Option<InteractionHandler>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            transform: Transform::default(),
            material: Material::default(),
            casts_shadow: true,
            animation: None,
            interaction: None,
            parent: None,
            kind,
        }
    }

    /// A built-in shape
    pub fn primitive(primitive: Primitive) -> Self {
        Self::with_kind(NodeKind::Primitive(primitive))
    }

    /// Geometry loaded by the asset importer
    pub fn imported(model: Rc<ImportedModel>) -> Self {
        Self::with_kind(NodeKind::ImportedMesh(model))
    }

    /// Collision box with full dimensions along local X, Y and Z
    pub fn collision_volume(width: f32, height: f32, depth: f32) -> Self {
        Self {
            casts_shadow: false,
            ..Self::with_kind(NodeKind::CollisionVolume { width, height, depth })
        }
    }

    /// A text label; labels never cast shadows
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            casts_shadow: false,
            ..Self::with_kind(NodeKind::TextLabel(content.into()))
        }
    }

    /// An empty group
    pub fn composite() -> Self {
        Self::with_kind(NodeKind::Composite(Children::default()))
    }

    /// Set the local position
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the local Euler rotation (degrees)
    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Set the local scale
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Set the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Set whether the node casts a planar shadow
    pub fn with_shadow(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    /// Attach a per-frame animation
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Attach an interaction handler
    pub fn with_interaction(mut self, handler: InteractionHandler) -> Self {
        self.interaction = Some(handler);
        self
    }

    /// What the node is
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Owning composite, `None` for roots
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids; empty for leaves
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Composite(children) => children.as_slice(),
            _ => &[],
        }
    }

    /// True if the node's material is see-through
    pub fn is_transparent(&self) -> bool {
        self.material.is_transparent()
    }

    /// Swing state, if the node swings
    pub fn swing(&self) -> Option<&SwingState> {
        match &self.animation {
            Some(Animation::Swing(state)) => Some(state),
            _ => None,
        }
    }

    /// Run this node's animation for one frame
    pub fn tick(&mut self, delta_time: f32) {
        if let Some(animation) = self.animation.as_mut() {
            animation.apply(&mut self.transform, delta_time);
        }
    }

    /// Run this node's interaction handler; `false` if it has none
    pub fn handle_interaction(&mut self, context: &InteractionContext) -> bool {
        match self.interaction.clone() {
            Some(InteractionHandler::ToggleSwing) => {
                match self.animation.as_mut() {
                    Some(Animation::Swing(state)) => {
                        state.toggle(
                            context.viewer_position - context.node_position,
                            context.node_rotation.y,
                        );
                        log::debug!("Swing target set to {:.1} degrees", state.target);
                    }
                    _ => log::warn!("ToggleSwing handler on a node without a swing animation"),
                }
                true
            }
            Some(InteractionHandler::Custom(handler)) => {
                handler(self, context);
                true
            }
            None => false,
        }
    }
}
