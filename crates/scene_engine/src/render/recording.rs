//! In-memory backend
//!
//! Keeps a real matrix stack and the current device state, and records every
//! state change and draw with the transform it was issued under. Used by the
//! headless showroom and by tests that inspect what a frame produced.

use crate::assets::TextureImage;
use crate::foundation::math::{utils, Mat4, Rotation3, Unit, Vec3};

use super::backend::{BackendResult, CullFace, Fog, RenderBackend};
use super::lighting::LightSource;
use super::material::{Material, Rgba};
use super::mesh::Mesh;
use super::RenderError;

/// Device toggles at the time of a draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceState {
    /// Lighting enabled
    pub lighting: bool,
    /// Depth test enabled
    pub depth_test: bool,
    /// Depth writes enabled
    pub depth_write: bool,
    /// Face culling
    pub cull_face: Option<CullFace>,
    /// Alpha blending enabled
    pub blending: bool,
    /// Depth bias
    pub polygon_offset: Option<(f32, f32)>,
    /// Current lit material
    pub material: Material,
    /// Current unlit colour
    pub flat_color: Rgba,
    /// A texture is bound
    pub textured: bool,
    /// Background colour
    pub clear_color: Rgba,
    /// Distance fog
    pub fog: Option<Fog>,
    /// Ambient light independent of the light slots
    pub global_ambient: Rgba,
    /// Eye-relative specular highlights
    pub local_viewer: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            lighting: true,
            depth_test: true,
            depth_write: true,
            cull_face: None,
            blending: false,
            polygon_offset: None,
            material: Material::default(),
            flat_color: [1.0, 1.0, 1.0, 1.0],
            textured: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            fog: None,
            global_ambient: [0.2, 0.2, 0.2, 1.0],
            local_viewer: false,
        }
    }
}

/// What a draw call emitted
#[derive(Debug, Clone, PartialEq)]
pub enum DrawnPrimitive {
    /// Indexed triangles
    Mesh {
        /// Triangle count
        triangles: usize,
    },
    /// Flat debug box of the given full size
    DebugBox(Vec3),
    /// Text
    Text(String),
}

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// What was drawn
    pub primitive: DrawnPrimitive,
    /// Transform on top of the stack (view included)
    pub transform: Mat4,
    /// Device state at the time
    pub state: DeviceState,
}

/// Recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Frame started
    BeginFrame,
    /// Frame finished
    EndFrame,
    /// Frame dropped after an error
    AbortFrame,
    /// Clear colour changed
    SetClearColor(Rgba),
    /// Fog changed
    SetFog(Option<Fog>),
    /// Global ambient changed
    SetGlobalAmbient(Rgba),
    /// Local viewer toggled
    SetLocalViewer(bool),
    /// Light slot configured
    SetLight(u32, LightSource),
    /// Lighting toggled
    SetLighting(bool),
    /// Depth test toggled
    SetDepthTest(bool),
    /// Depth writes toggled
    SetDepthWrite(bool),
    /// Culling changed
    SetCullFace(Option<CullFace>),
    /// Blending toggled
    SetBlending(bool),
    /// Depth bias changed
    SetPolygonOffset(Option<(f32, f32)>),
    /// Extra matrix multiplied in
    MultiplyMatrix(Mat4),
    /// Geometry emitted
    Draw(DrawRecord),
}

/// Backend that records instead of rasterising
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    commands: Vec<RenderCommand>,
    stack: Vec<Mat4>,
    current: Mat4,
    state: DeviceState,
    in_frame: bool,
    frames: u64,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Create an idle backend
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            stack: Vec::new(),
            current: Mat4::identity(),
            state: DeviceState::default(),
            in_frame: false,
            frames: 0,
        }
    }

    /// Everything recorded since the last [`RecordingBackend::clear`]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Recorded draws in submission order
    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Draw(record) => Some(record),
            _ => None,
        })
    }

    /// Forget recorded commands, keeping device state
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Current device state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Transform on top of the stack
    pub fn current_transform(&self) -> &Mat4 {
        &self.current
    }

    /// Number of saved transforms
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Frames completed
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn record_draw(&mut self, primitive: DrawnPrimitive) -> BackendResult<()> {
        if !self.in_frame {
            return Err(RenderError::FrameNotStarted);
        }
        self.commands.push(RenderCommand::Draw(DrawRecord {
            primitive,
            transform: self.current,
            state: self.state,
        }));
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, view: &Mat4) -> BackendResult<()> {
        if self.in_frame {
            return Err(RenderError::Backend("begin_frame called twice".to_string()));
        }
        self.in_frame = true;
        self.stack.clear();
        self.current = *view;
        self.commands.push(RenderCommand::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        if !self.in_frame {
            return Err(RenderError::FrameNotStarted);
        }
        if !self.stack.is_empty() {
            return Err(RenderError::Backend(format!(
                "{} transform(s) still pushed at end of frame",
                self.stack.len()
            )));
        }
        self.in_frame = false;
        self.frames += 1;
        self.commands.push(RenderCommand::EndFrame);
        Ok(())
    }

    fn abort_frame(&mut self) {
        if !self.in_frame {
            return;
        }
        self.in_frame = false;
        self.stack.clear();
        self.commands.push(RenderCommand::AbortFrame);
    }

    fn set_clear_color(&mut self, color: Rgba) {
        self.state.clear_color = color;
        self.commands.push(RenderCommand::SetClearColor(color));
    }

    fn set_fog(&mut self, fog: Option<Fog>) {
        self.state.fog = fog;
        self.commands.push(RenderCommand::SetFog(fog));
    }

    fn set_global_ambient(&mut self, color: Rgba) {
        self.state.global_ambient = color;
        self.commands.push(RenderCommand::SetGlobalAmbient(color));
    }

    fn set_local_viewer(&mut self, enabled: bool) {
        self.state.local_viewer = enabled;
        self.commands.push(RenderCommand::SetLocalViewer(enabled));
    }

    fn push_transform(&mut self) {
        self.stack.push(self.current);
    }

    fn pop_transform(&mut self) -> BackendResult<()> {
        self.current = self.stack.pop().ok_or(RenderError::TransformStackUnderflow)?;
        Ok(())
    }

    fn translate(&mut self, offset: Vec3) {
        self.current *= Mat4::new_translation(&offset);
    }

    fn rotate(&mut self, degrees: f32, axis: Vec3) {
        if axis.norm() <= f32::EPSILON {
            return;
        }
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), utils::deg_to_rad(degrees));
        self.current *= rotation.to_homogeneous();
    }

    fn scale(&mut self, factors: Vec3) {
        self.current *= Mat4::new_nonuniform_scaling(&factors);
    }

    fn multiply_matrix(&mut self, matrix: &Mat4) {
        self.current *= matrix;
        self.commands.push(RenderCommand::MultiplyMatrix(*matrix));
    }

    fn set_material(&mut self, material: &Material) {
        self.state.material = *material;
    }

    fn set_flat_color(&mut self, color: Rgba) {
        self.state.flat_color = color;
    }

    fn bind_texture(&mut self, texture: Option<&TextureImage>) {
        self.state.textured = texture.is_some();
    }

    fn set_light(&mut self, slot: u32, light: &LightSource) {
        self.commands.push(RenderCommand::SetLight(slot, *light));
    }

    fn set_lighting(&mut self, enabled: bool) {
        self.state.lighting = enabled;
        self.commands.push(RenderCommand::SetLighting(enabled));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
        self.commands.push(RenderCommand::SetDepthTest(enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.state.depth_write = enabled;
        self.commands.push(RenderCommand::SetDepthWrite(enabled));
    }

    fn set_cull_face(&mut self, cull: Option<CullFace>) {
        self.state.cull_face = cull;
        self.commands.push(RenderCommand::SetCullFace(cull));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
        self.commands.push(RenderCommand::SetBlending(enabled));
    }

    fn set_polygon_offset(&mut self, offset: Option<(f32, f32)>) {
        self.state.polygon_offset = offset;
        self.commands.push(RenderCommand::SetPolygonOffset(offset));
    }

    fn draw_mesh(&mut self, mesh: &Mesh) -> BackendResult<()> {
        self.record_draw(DrawnPrimitive::Mesh {
            triangles: mesh.triangle_count(),
        })
    }

    fn draw_debug_box(&mut self, size: Vec3) -> BackendResult<()> {
        self.record_draw(DrawnPrimitive::DebugBox(size))
    }

    fn draw_text(&mut self, text: &str) -> BackendResult<()> {
        self.record_draw(DrawnPrimitive::Text(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_stack_composes_and_restores() {
        let mut backend = RecordingBackend::new();
        backend.begin_frame(&Mat4::identity()).unwrap();
        backend.push_transform();
        backend.translate(Vec3::new(1.0, 0.0, 0.0));
        backend.rotate(90.0, Vec3::new(0.0, 1.0, 0.0));
        let p = backend.current_transform().transform_point(&Vec3::new(1.0, 0.0, 0.0).into());
        assert_relative_eq!(p.coords, Vec3::new(1.0, 0.0, -1.0), epsilon = 1e-6);

        backend.pop_transform().unwrap();
        assert_eq!(*backend.current_transform(), Mat4::identity());
        assert!(matches!(backend.pop_transform(), Err(RenderError::TransformStackUnderflow)));
    }

    #[test]
    fn test_draw_outside_frame_fails() {
        let mut backend = RecordingBackend::new();
        assert!(matches!(backend.draw_text("hi"), Err(RenderError::FrameNotStarted)));
    }

    #[test]
    fn test_unbalanced_frame_fails() {
        let mut backend = RecordingBackend::new();
        backend.begin_frame(&Mat4::identity()).unwrap();
        backend.push_transform();
        assert!(backend.end_frame().is_err());
    }

    #[test]
    fn test_abort_lets_next_frame_begin() {
        let mut backend = RecordingBackend::new();
        backend.begin_frame(&Mat4::identity()).unwrap();
        backend.push_transform();
        backend.push_transform();
        assert!(backend.begin_frame(&Mat4::identity()).is_err());

        backend.abort_frame();
        assert_eq!(backend.stack_depth(), 0);
        assert_eq!(backend.frames(), 0);
        assert!(matches!(backend.draw_text("late"), Err(RenderError::FrameNotStarted)));

        backend.begin_frame(&Mat4::identity()).unwrap();
        backend.end_frame().unwrap();
        assert_eq!(backend.frames(), 1);
        assert!(backend.commands().contains(&RenderCommand::AbortFrame));
    }
}
