//! OBJ file importer for 3D models
//!
//! Faces are split into one mesh per `usemtl` run. Polygons are fan
//! triangulated. Missing normals default to +Y and missing texture
//! coordinates to (0, 0).

use std::collections::HashMap;

use crate::render::{Mesh, Vertex};

use super::AssetError;

/// One sub-mesh and the name of the material it was drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct ObjGroup {
    /// Name given by `usemtl`, if any
    pub material: Option<String>,
    /// Triangulated geometry
    pub mesh: Mesh,
}

/// Geometry of an OBJ file before materials are resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    /// Sub-meshes in file order; empty groups are dropped
    pub groups: Vec<ObjGroup>,
    /// Files named by `mtllib`
    pub material_libraries: Vec<String>,
}

/// OBJ text parser
pub struct ObjImporter;

impl ObjImporter {
    /// Parse the contents of an OBJ file
    pub fn parse(contents: &str) -> Result<ObjData, AssetError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();

        let mut data = ObjData::default();
        let mut current = GroupBuilder::new(None);

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" => positions.push(parse_floats::<3>(&parts[1..], line_num)?),
                "vn" => normals.push(parse_floats::<3>(&parts[1..], line_num)?),
                "vt" => tex_coords.push(parse_floats::<2>(&parts[1..], line_num)?),
                "mtllib" => data.material_libraries.push(parts[1..].join(" ")),
                "usemtl" => {
                    let name = parts[1..].join(" ");
                    let finished = std::mem::replace(&mut current, GroupBuilder::new(Some(name)));
                    finished.finish_into(&mut data.groups);
                }
                "f" => {
                    if parts.len() < 4 {
                        return Err(AssetError::Parse(format!(
                            "line {}: face needs at least three vertices",
                            line_num + 1
                        )));
                    }
                    let mut face = Vec::with_capacity(parts.len() - 1);
                    for corner in &parts[1..] {
                        let key = parse_corner(corner, positions.len(), tex_coords.len(), normals.len(), line_num)?;
                        face.push(current.vertex(key, &positions, &tex_coords, &normals));
                    }
                    for i in 1..face.len() - 1 {
                        current.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                    }
                }
                _ => {}
            }
        }

        current.finish_into(&mut data.groups);

        if data.groups.is_empty() {
            return Err(AssetError::Parse("no faces found in OBJ data".to_string()));
        }
        Ok(data)
    }
}

type CornerKey = (usize, Option<usize>, Option<usize>);

struct GroupBuilder {
    material: Option<String>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    dedup: HashMap<CornerKey, u32>,
}

impl GroupBuilder {
    fn new(material: Option<String>) -> Self {
        Self {
            material,
            vertices: Vec::new(),
            indices: Vec::new(),
            dedup: HashMap::new(),
        }
    }

    fn vertex(
        &mut self,
        key: CornerKey,
        positions: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
        normals: &[[f32; 3]],
    ) -> u32 {
        if let Some(&index) = self.dedup.get(&key) {
            return index;
        }
        let (p, t, n) = key;
        let vertex = Vertex::new(
            positions[p],
            n.map_or([0.0, 1.0, 0.0], |n| normals[n]),
            t.map_or([0.0, 0.0], |t| tex_coords[t]),
        );
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        self.dedup.insert(key, index);
        index
    }

    fn finish_into(self, groups: &mut Vec<ObjGroup>) {
        if self.indices.is_empty() {
            return;
        }
        groups.push(ObjGroup {
            material: self.material,
            mesh: Mesh::new(self.vertices, self.indices),
        });
    }
}

fn parse_floats<const N: usize>(tokens: &[&str], line_num: usize) -> Result<[f32; N], AssetError> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens.get(i).ok_or_else(|| {
            AssetError::Parse(format!("line {}: expected {} values", line_num + 1, N))
        })?;
        *slot = token.parse().map_err(|_| {
            AssetError::Parse(format!("line {}: invalid number '{}'", line_num + 1, token))
        })?;
    }
    Ok(out)
}

// OBJ indices are 1-based; negative values count back from the latest element
fn resolve_index(token: &str, count: usize, line_num: usize) -> Result<usize, AssetError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| AssetError::Parse(format!("line {}: invalid index '{}'", line_num + 1, token)))?;
    let resolved = if raw > 0 { raw - 1 } else { count as i64 + raw };
    if raw == 0 || resolved < 0 || resolved >= count as i64 {
        return Err(AssetError::Parse(format!(
            "line {}: index {} out of bounds",
            line_num + 1,
            raw
        )));
    }
    Ok(resolved as usize)
}

fn parse_corner(
    corner: &str,
    position_count: usize,
    tex_count: usize,
    normal_count: usize,
    line_num: usize,
) -> Result<CornerKey, AssetError> {
    let mut fields = corner.split('/');
    let position = resolve_index(fields.next().unwrap_or_default(), position_count, line_num)?;
    let tex = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, tex_count, line_num)?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, normal_count, line_num)?),
        _ => None,
    };
    Ok((position, tex, normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_AND_TRIANGLE: &str = r#"
mtllib car.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 1
usemtl Body
f 1/1/1 2/1/1 3/2/1 4/2/1
usemtl Glass
f -4//1 -3//1 -2//1
"#;

    #[test]
    fn test_groups_split_by_usemtl() {
        let data = ObjImporter::parse(QUAD_AND_TRIANGLE).unwrap();
        assert_eq!(data.material_libraries, vec!["car.mtl".to_string()]);
        assert_eq!(data.groups.len(), 2);

        let body = &data.groups[0];
        assert_eq!(body.material.as_deref(), Some("Body"));
        assert_eq!(body.mesh.triangle_count(), 2);
        assert_eq!(body.mesh.vertices.len(), 4);

        let glass = &data.groups[1];
        assert_eq!(glass.material.as_deref(), Some("Glass"));
        assert_eq!(glass.mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(glass.mesh.vertices[0].tex_coord, [0.0, 0.0]);
    }

    #[test]
    fn test_out_of_bounds_index_fails() {
        let result = ObjImporter::parse("v 0 0 0\nf 1 2 3\n");
        assert!(matches!(result, Err(AssetError::Parse(_))));
    }

    #[test]
    fn test_no_faces_fails() {
        assert!(ObjImporter::parse("v 0 0 0\n").is_err());
    }
}
