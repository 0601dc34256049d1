//! Backend abstraction trait for the rendering system
//!
//! The pipeline drives a fixed-function style device: a matrix stack, a small
//! set of toggles and immediate geometry submission. Windowed backends and
//! the in-memory [`RecordingBackend`](super::RecordingBackend) implement it.

use crate::assets::TextureImage;
use crate::foundation::math::{Mat4, Vec3};

use super::lighting::LightSource;
use super::material::{Material, Rgba};
use super::mesh::Mesh;
use super::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Which faces are discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullFace {
    /// Discard faces pointing at the viewer
    Front,
    /// Discard faces pointing away from the viewer
    Back,
}

/// Exponential-squared distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Colour distant geometry fades to
    pub color: Rgba,
    /// Density; visibility falls off as `exp(-(density * distance)^2)`
    pub density: f32,
}

/// Main rendering backend trait
pub trait RenderBackend {
    /// Start a frame with the given view matrix loaded
    fn begin_frame(&mut self, view: &Mat4) -> BackendResult<()>;

    /// Finish and present the frame
    fn end_frame(&mut self) -> BackendResult<()>;

    /// Drop a frame that failed partway through
    ///
    /// Saved transforms are discarded so the next `begin_frame` starts clean.
    fn abort_frame(&mut self);

    /// Colour the frame is cleared to
    fn set_clear_color(&mut self, color: Rgba);

    /// Enable fog, or disable it with `None`
    fn set_fog(&mut self, fog: Option<Fog>);

    /// Ambient light applied regardless of light slots
    fn set_global_ambient(&mut self, color: Rgba);

    /// Toggle eye-relative specular highlights
    fn set_local_viewer(&mut self, enabled: bool);

    /// Save the current transform
    fn push_transform(&mut self);

    /// Restore the last saved transform
    fn pop_transform(&mut self) -> BackendResult<()>;

    /// Post-multiply a translation
    fn translate(&mut self, offset: Vec3);

    /// Post-multiply a rotation of `degrees` about `axis`
    fn rotate(&mut self, degrees: f32, axis: Vec3);

    /// Post-multiply a scale
    fn scale(&mut self, factors: Vec3);

    /// Post-multiply an arbitrary matrix
    fn multiply_matrix(&mut self, matrix: &Mat4);

    /// Set the current lit material
    fn set_material(&mut self, material: &Material);

    /// Set the colour used while lighting is off
    fn set_flat_color(&mut self, color: Rgba);

    /// Bind a texture for subsequent geometry, or unbind with `None`
    fn bind_texture(&mut self, texture: Option<&TextureImage>);

    /// Configure a light slot
    fn set_light(&mut self, slot: u32, light: &LightSource);

    /// Toggle lighting
    fn set_lighting(&mut self, enabled: bool);

    /// Toggle depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Toggle depth buffer writes
    fn set_depth_write(&mut self, enabled: bool);

    /// Set face culling; `None` disables it
    fn set_cull_face(&mut self, cull: Option<CullFace>);

    /// Toggle source-alpha / one-minus-source-alpha blending
    fn set_blending(&mut self, enabled: bool);

    /// Set a constant depth bias `(factor, units)`; `None` disables it
    fn set_polygon_offset(&mut self, offset: Option<(f32, f32)>);

    /// Submit indexed triangles under the current transform
    fn draw_mesh(&mut self, mesh: &Mesh) -> BackendResult<()>;

    /// Draw a flat box of the given full size, centred on the origin
    fn draw_debug_box(&mut self, size: Vec3) -> BackendResult<()>;

    /// Draw a line of text centred on the origin, about one unit tall
    fn draw_text(&mut self, text: &str) -> BackendResult<()>;
}
