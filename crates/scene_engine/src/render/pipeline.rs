//! Four-stage frame: opaque, planar shadow, blend setup, transparent
//!
//! Each frame first loads the atmosphere and light slots and resets the
//! device toggles. A stage that fails aborts the frame on the backend so the
//! next frame can begin.
//!
//! Every stage walks the root set in order. A composite applies its local
//! transform once and recurses; a leaf applies its own transform, its material
//! and emits geometry. Local transforms are issued as translate, rotate Z,
//! rotate Y, rotate X, scale, which is the same map as
//! [`SceneGraph::world_point`].
//!
//! Transparent leaves are drawn twice with depth writes off, back faces
//! first, then front faces. For convex see-through volumes such as glass
//! panes this composites correctly without sorting.

use crate::core::config::{AtmosphereConfig, ShadowConfig};
use crate::foundation::math::{Mat4, Transform, Vec3, Vec4};
use crate::scene::{Node, NodeId, NodeKind, Primitive, SceneGraph};

use super::backend::{CullFace, Fog, RenderBackend};
use super::lighting::LightingRig;
use super::mesh::Mesh;
use super::shadow::shadow_matrix;
use super::RenderError;

/// Colour of collision volumes when they are shown
pub const COLLISION_DEBUG_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// Meshes shared by every primitive leaf
#[derive(Debug, Clone)]
pub struct PrimitiveMeshes {
    cube: Mesh,
    cylinder: Mesh,
    plane: Mesh,
}

impl PrimitiveMeshes {
    /// Generate the cube, 20-slice cylinder and 20x20 floor plane
    pub fn new() -> Self {
        Self {
            cube: Mesh::cube(),
            cylinder: Mesh::cylinder(0.5, 1.0, 20),
            plane: Mesh::plane(20),
        }
    }

    /// Mesh for a primitive
    pub fn get(&self, primitive: Primitive) -> &Mesh {
        match primitive {
            Primitive::Cube => &self.cube,
            Primitive::Cylinder => &self.cylinder,
            Primitive::Plane => &self.plane,
        }
    }
}

impl Default for PrimitiveMeshes {
    fn default() -> Self {
        Self::new()
    }
}

/// Leaves drawn in each stage of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Opaque stage
    pub opaque: usize,
    /// Flattened into the shadow
    pub shadow: usize,
    /// Transparent back faces
    pub transparent_back: usize,
    /// Transparent front faces
    pub transparent_front: usize,
}

impl FrameStats {
    /// Leaf draws across all stages
    pub fn total(&self) -> usize {
        self.opaque + self.shadow + self.transparent_back + self.transparent_front
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Opaque,
    Shadow,
    Transparent,
}

/// Multi-pass scene renderer
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    meshes: PrimitiveMeshes,
    shadow: ShadowConfig,
    atmosphere: AtmosphereConfig,
    shadow_matrix: Mat4,
    show_collision_volumes: bool,
}

impl RenderPipeline {
    /// Create a pipeline; the shadow matrix is built once here
    pub fn new(shadow: ShadowConfig, atmosphere: AtmosphereConfig, show_collision_volumes: bool) -> Self {
        let matrix = shadow_matrix(Vec4::from(shadow.light), Vec4::from(shadow.ground_plane));
        Self {
            meshes: PrimitiveMeshes::new(),
            shadow,
            atmosphere,
            shadow_matrix: matrix,
            show_collision_volumes,
        }
    }

    /// Planar projection applied in the shadow stage
    pub fn shadow_matrix(&self) -> &Mat4 {
        &self.shadow_matrix
    }

    /// Toggle collision volume drawing
    pub fn set_show_collision_volumes(&mut self, visible: bool) {
        self.show_collision_volumes = visible;
    }

    /// Render one frame of `graph` as seen through `view`
    pub fn render_frame<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        graph: &SceneGraph,
        lights: &LightingRig,
        view: &Mat4,
    ) -> Result<FrameStats, RenderError> {
        backend.begin_frame(view)?;
        let stats = match self.draw_stages(backend, graph, lights) {
            Ok(stats) => stats,
            Err(e) => {
                log::warn!("Frame aborted: {}", e);
                backend.abort_frame();
                return Err(e);
            }
        };
        backend.end_frame()?;
        log::trace!("Frame drawn: {:?}", stats);
        Ok(stats)
    }

    fn draw_stages<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        graph: &SceneGraph,
        lights: &LightingRig,
    ) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();

        self.frame_setup(backend, lights);
        stats.opaque = self.opaque_stage(backend, graph)?;
        stats.shadow = self.shadow_stage(backend, graph)?;
        Self::blend_setup(backend);
        let (back, front) = self.transparent_stage(backend, graph)?;
        stats.transparent_back = back;
        stats.transparent_front = front;
        Ok(stats)
    }

    fn frame_setup<B: RenderBackend + ?Sized>(&self, backend: &mut B, lights: &LightingRig) {
        let atmosphere = &self.atmosphere;
        backend.set_clear_color(atmosphere.clear_color);
        let fog = (atmosphere.fog_density > 0.0).then_some(Fog {
            color: atmosphere.fog_color,
            density: atmosphere.fog_density,
        });
        backend.set_fog(fog);
        backend.set_global_ambient(atmosphere.global_ambient);
        backend.set_local_viewer(atmosphere.local_viewer);

        for (slot, light) in lights.slots() {
            backend.set_light(slot, &light);
        }
        backend.set_lighting(true);
        backend.set_depth_test(true);
        backend.set_depth_write(true);
        backend.set_blending(false);
        backend.set_cull_face(None);
    }

    fn opaque_stage<B: RenderBackend + ?Sized>(&self, backend: &mut B, graph: &SceneGraph) -> Result<usize, RenderError> {
        let mut drawn = 0;
        for &root in graph.roots() {
            drawn += self.draw_subtree(backend, graph, root, Pass::Opaque)?;
        }
        Ok(drawn)
    }

    fn shadow_stage<B: RenderBackend + ?Sized>(&self, backend: &mut B, graph: &SceneGraph) -> Result<usize, RenderError> {
        backend.set_lighting(false);
        backend.set_depth_write(false);
        backend.set_polygon_offset(Some(self.shadow.depth_bias));

        backend.push_transform();
        backend.multiply_matrix(&self.shadow_matrix);
        backend.set_flat_color(self.shadow.color);

        let mut drawn = 0;
        for &root in graph.roots() {
            let Some(node) = graph.get(root) else {
                continue;
            };
            if !node.is_transparent() && node.casts_shadow {
                drawn += self.draw_subtree(backend, graph, root, Pass::Shadow)?;
            }
        }

        backend.pop_transform()?;
        backend.set_polygon_offset(None);
        backend.set_depth_write(true);
        Ok(drawn)
    }

    fn blend_setup<B: RenderBackend + ?Sized>(backend: &mut B) {
        backend.set_blending(true);
        backend.set_lighting(true);
    }

    fn transparent_stage<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        graph: &SceneGraph,
    ) -> Result<(usize, usize), RenderError> {
        backend.set_depth_write(false);

        backend.set_cull_face(Some(CullFace::Front));
        let mut back = 0;
        for &root in graph.roots() {
            back += self.draw_subtree(backend, graph, root, Pass::Transparent)?;
        }

        backend.set_cull_face(Some(CullFace::Back));
        let mut front = 0;
        for &root in graph.roots() {
            front += self.draw_subtree(backend, graph, root, Pass::Transparent)?;
        }

        backend.set_cull_face(None);
        backend.set_depth_write(true);
        Ok((back, front))
    }

    fn leaf_in_pass(&self, node: &Node, pass: Pass) -> bool {
        match (pass, node.kind()) {
            (_, NodeKind::Composite(_)) => false,
            (Pass::Opaque, NodeKind::CollisionVolume { .. }) => self.show_collision_volumes,
            (_, NodeKind::CollisionVolume { .. }) => false,
            (Pass::Opaque, _) => !node.is_transparent(),
            (Pass::Shadow, NodeKind::TextLabel(_)) => false,
            (Pass::Shadow, _) => node.casts_shadow,
            (Pass::Transparent, _) => node.is_transparent(),
        }
    }

    fn draw_subtree<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        graph: &SceneGraph,
        id: NodeId,
        pass: Pass,
    ) -> Result<usize, RenderError> {
        let Some(node) = graph.get(id) else {
            return Ok(0);
        };

        if let NodeKind::Composite(children) = node.kind() {
            backend.push_transform();
            apply_local_transform(backend, &node.transform);
            let mut drawn = 0;
            for &child in children.as_slice() {
                drawn += self.draw_subtree(backend, graph, child, pass)?;
            }
            backend.pop_transform()?;
            return Ok(drawn);
        }

        if !self.leaf_in_pass(node, pass) {
            return Ok(0);
        }

        backend.push_transform();
        apply_local_transform(backend, &node.transform);
        self.draw_leaf(backend, node, pass)?;
        backend.pop_transform()?;
        Ok(1)
    }

    fn draw_leaf<B: RenderBackend + ?Sized>(&self, backend: &mut B, node: &Node, pass: Pass) -> Result<(), RenderError> {
        // The shadow stage draws in its flat colour only
        let lit = pass != Pass::Shadow;
        if lit {
            backend.set_material(&node.material);
        }

        match node.kind() {
            NodeKind::Primitive(primitive) => backend.draw_mesh(self.meshes.get(*primitive))?,
            NodeKind::ImportedMesh(model) => {
                for group in &model.groups {
                    if lit {
                        let imported = model.group_material(group);
                        if let Some(imported) = imported {
                            backend.set_material(&imported.material);
                        }
                        backend.bind_texture(imported.and_then(|m| m.texture.as_deref()));
                    }
                    backend.draw_mesh(&group.mesh)?;
                }
                if lit {
                    backend.bind_texture(None);
                }
            }
            NodeKind::CollisionVolume { width, height, depth } => {
                backend.set_lighting(false);
                backend.set_flat_color(COLLISION_DEBUG_COLOR);
                backend.draw_debug_box(Vec3::new(*width, *height, *depth))?;
                backend.set_lighting(true);
            }
            NodeKind::TextLabel(text) => backend.draw_text(text)?,
            NodeKind::Composite(_) => {}
        }
        Ok(())
    }
}

fn apply_local_transform<B: RenderBackend + ?Sized>(backend: &mut B, transform: &Transform) {
    backend.translate(transform.position);
    backend.rotate(transform.rotation.z, Vec3::z());
    backend.rotate(transform.rotation.y, Vec3::y());
    backend.rotate(transform.rotation.x, Vec3::x());
    backend.scale(transform.scale);
}
