//! # Rendering System
//!
//! Backend-agnostic multi-pass renderer for the scene graph.
//!
//! ## Architecture
//!
//! - **RenderPipeline**: walks the scene once per stage and drives a backend
//! - **RenderBackend**: matrix stack, device toggles and geometry submission
//! - **RecordingBackend**: headless backend that records what a frame did
//! - **Resource Types**: meshes, materials and the lighting rig
//!
//! A frame opens by loading the atmosphere (clear colour, fog, global
//! ambient) and the light slots, then runs four stages in a fixed order: opaque geometry, the planar
//! shadow of shadow casters, blend setup, and transparent geometry in two
//! culled sub-passes.

pub mod backend;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod recording;
pub mod shadow;

pub use backend::{BackendResult, CullFace, Fog, RenderBackend};
pub use lighting::{DirectionalLight, LightSource, LightingRig, PointLight};
pub use material::{Material, Rgba};
pub use mesh::{Mesh, Vertex};
pub use pipeline::{FrameStats, PrimitiveMeshes, RenderPipeline};
pub use recording::{DeviceState, DrawRecord, DrawnPrimitive, RecordingBackend, RenderCommand};
pub use shadow::shadow_matrix;

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Geometry was submitted outside `begin_frame`/`end_frame`
    #[error("Draw issued outside of a frame")]
    FrameNotStarted,

    /// More pops than pushes on the transform stack
    #[error("Transform stack underflow")]
    TransformStackUnderflow,
}
