//! Scene graph
//!
//! Hierarchical tree of transformable nodes stored in an arena. Composite
//! nodes own ordered children; leaves carry geometry, a collision box or text.

pub mod node;
pub mod scene_graph;
pub mod transform;
pub mod traversal;

pub use node::{
    Animation, Children, InteractionContext, InteractionHandler, Node, NodeKind, Primitive,
    SwingState,
};
pub use scene_graph::{Ancestors, NodeId, Placement, SceneGraph};

use thiserror::Error;

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Children can only be attached to composite nodes
    #[error("Node {0:?} is not a composite")]
    NotComposite(NodeId),
}
