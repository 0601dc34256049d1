//! # Scene Engine
//!
//! A small real-time 3D scene engine built around a hierarchical scene graph.
//!
//! ## Features
//!
//! - **Scene Graph**: arena-backed tree of Euler-transformed nodes with
//!   local/world conversion across any depth
//! - **Multi-pass Rendering**: opaque, planar shadow and two-sided transparent
//!   stages over a backend trait
//! - **Collision**: oriented-box tests against a first-person player cylinder
//!   with per-axis sliding
//! - **Interaction**: ray-picked leaves with handler bubbling to ancestors
//! - **Assets**: OBJ/MTL models and PNG textures with graceful fallback
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut engine = Engine::new(ApplicationConfig::default()).unwrap();
//! let room = engine.scene.add_root(Node::composite());
//! engine
//!     .scene
//!     .add_child(room, Node::primitive(Primitive::Cube).at(Vec3::new(0.0, 0.5, -3.0)))
//!     .unwrap();
//!
//! engine.update_frame(1.0 / 60.0);
//! let mut backend = RecordingBackend::new();
//! let stats = engine.render_frame(&mut backend).unwrap();
//! assert_eq!(stats.opaque, 1);
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod input;
pub mod interaction;
pub mod physics;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetLoader, ImportedModel},
        core::config::{ApplicationConfig, Config, EngineConfig},
        foundation::math::{Transform, Vec3},
        input::{KeyCode, Viewer},
        physics::PhysicsRegistry,
        render::{LightingRig, Material, PointLight, RecordingBackend, RenderBackend},
        scene::{Animation, InteractionHandler, Node, NodeId, Placement, Primitive, SceneGraph, SwingState},
        Engine, EngineError,
    };
}
