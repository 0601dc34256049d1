//! Mesh representation for 3D geometry
//!
//! Pure data: indexed triangles with per-vertex normal and texture coordinate.
//! Also generates the shared primitive meshes (cube, cylinder, subdivided
//! floor plane) that primitive scene leaves emit.

use std::f32::consts::TAU;

/// 3D vertex data structure for rendering
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Unit cube centred on the origin, four vertices per face
    pub fn cube() -> Self {
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = [
                    0.5 * (normal[0] + su * u[0] + sv * v[0]),
                    0.5 * (normal[1] + su * u[1] + sv * v[1]),
                    0.5 * (normal[2] + su * u[2] + sv * v[2]),
                ];
                let tex_coord = [(su + 1.0) * 0.5, (sv + 1.0) * 0.5];
                vertices.push(Vertex::new(position, normal, tex_coord));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices)
    }

    /// Capped cylinder along +Z from 0 to `height`, matching the classic GLUT solid
    pub fn cylinder(radius: f32, height: f32, slices: u32) -> Self {
        let slices = slices.max(3);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side wall
        for i in 0..=slices {
            let angle = TAU * i as f32 / slices as f32;
            let (s, c) = angle.sin_cos();
            let u = i as f32 / slices as f32;
            vertices.push(Vertex::new([c * radius, s * radius, 0.0], [c, s, 0.0], [u, 0.0]));
            vertices.push(Vertex::new([c * radius, s * radius, height], [c, s, 0.0], [u, 1.0]));
        }
        for i in 0..slices {
            let b = i * 2;
            indices.extend_from_slice(&[b, b + 2, b + 1, b + 1, b + 2, b + 3]);
        }

        // Caps
        for (z, nz) in [(0.0, -1.0), (height, 1.0)] {
            let center = vertices.len() as u32;
            vertices.push(Vertex::new([0.0, 0.0, z], [0.0, 0.0, nz], [0.5, 0.5]));
            for i in 0..slices {
                let angle = TAU * i as f32 / slices as f32;
                let (s, c) = angle.sin_cos();
                vertices.push(Vertex::new(
                    [c * radius, s * radius, z],
                    [0.0, 0.0, nz],
                    [0.5 + 0.5 * c, 0.5 + 0.5 * s],
                ));
            }
            for i in 0..slices {
                let a = center + 1 + i;
                let b = center + 1 + (i + 1) % slices;
                if nz > 0.0 {
                    indices.extend_from_slice(&[center, a, b]);
                } else {
                    indices.extend_from_slice(&[center, b, a]);
                }
            }
        }
        Self::new(vertices, indices)
    }

    /// Floor plane spanning [-1, 1] on X and Z at y = 0, split into a grid
    ///
    /// The subdivision keeps per-vertex lighting smooth under point lights.
    pub fn plane(divisions: u32) -> Self {
        let divisions = divisions.max(1);
        let step = 2.0 / divisions as f32;
        let row = divisions + 1;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for z in 0..row {
            for x in 0..row {
                let px = -1.0 + x as f32 * step;
                let pz = -1.0 + z as f32 * step;
                let uv = [x as f32 / divisions as f32, z as f32 / divisions as f32];
                vertices.push(Vertex::new([px, 0.0, pz], [0.0, 1.0, 0.0], uv));
            }
        }

        let mut indices = Vec::with_capacity((divisions * divisions * 6) as usize);
        for z in 0..divisions {
            for x in 0..divisions {
                let i0 = z * row + x;
                let i1 = i0 + row;
                indices.extend_from_slice(&[i0, i1, i1 + 1, i0, i1 + 1, i0 + 1]);
            }
        }
        Self::new(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_is_unit_sized() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        for vertex in &cube.vertices {
            for c in vertex.position {
                assert!((c.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_plane_grid_counts() {
        let plane = Mesh::plane(20);
        assert_eq!(plane.vertices.len(), 21 * 21);
        assert_eq!(plane.triangle_count(), 20 * 20 * 2);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_cylinder_indices_in_range() {
        let cylinder = Mesh::cylinder(0.5, 1.0, 20);
        let count = cylinder.vertices.len() as u32;
        assert!(cylinder.indices.iter().all(|&i| i < count));
        assert_eq!(cylinder.triangle_count(), 20 * 2 + 20 * 2);
    }
}
