//! MTL (Material Template Library) file parser
//!
//! Parses Wavefront .mtl files into Phong colours plus an optional diffuse
//! texture path, which is everything the fixed-function material uses.

use std::collections::HashMap;

use crate::foundation::math::Vec3;
use crate::render::Material;

use super::AssetError;

/// Parsed MTL material data (Wavefront Phong model)
#[derive(Debug, Clone, PartialEq)]
pub struct MtlData {
    /// Material name
    pub name: String,
    /// Ambient color (Ka)
    pub ambient: Vec3,
    /// Diffuse color (Kd)
    pub diffuse: Vec3,
    /// Specular color (Ks)
    pub specular: Vec3,
    /// Emission color (Ke)
    pub emission: Vec3,
    /// Specular exponent (Ns), 0 to 1000
    pub specular_exponent: f32,
    /// Dissolve/opacity (d); 0 is fully transparent
    pub dissolve: f32,
    /// Diffuse texture map (map_Kd)
    pub diffuse_map: Option<String>,
}

impl Default for MtlData {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::zeros(),
            emission: Vec3::zeros(),
            specular_exponent: 0.0,
            dissolve: 1.0,
            diffuse_map: None,
        }
    }
}

impl MtlData {
    /// Fixed-function material for this entry
    ///
    /// The MTL exponent range (0..1000) is mapped onto the 0..128 range the
    /// fixed-function pipeline accepts.
    pub fn to_material(&self) -> Material {
        let alpha = self.dissolve.clamp(0.0, 1.0);
        let rgba = |c: Vec3| [c.x, c.y, c.z, alpha];
        Material {
            ambient: rgba(self.ambient),
            diffuse: rgba(self.diffuse),
            specular: [self.specular.x, self.specular.y, self.specular.z, 1.0],
            emission: [self.emission.x, self.emission.y, self.emission.z, 1.0],
            shininess: (self.specular_exponent / 1000.0 * 128.0).clamp(0.0, 128.0),
        }
    }
}

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL file contents into a map of material name -> MtlData
    pub fn parse(contents: &str) -> Result<HashMap<String, MtlData>, AssetError> {
        let mut materials = HashMap::new();
        let mut current: Option<MtlData> = None;

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };

            if command == "newmtl" {
                if let Some(mat) = current.take() {
                    materials.insert(mat.name.clone(), mat);
                }
                let name = tokens.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    return Err(parse_error(line_num, "newmtl missing material name"));
                }
                current = Some(MtlData {
                    name,
                    ..Default::default()
                });
                continue;
            }

            // Statements before the first newmtl have nothing to apply to
            let Some(mat) = current.as_mut() else {
                continue;
            };

            match command {
                "Ka" => mat.ambient = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Kd" => mat.diffuse = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Ks" => mat.specular = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Ke" => mat.emission = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Ns" => mat.specular_exponent = Self::parse_f32(&mut tokens, line_num, command)?,
                "d" => mat.dissolve = Self::parse_f32(&mut tokens, line_num, command)?,
                "Tr" => mat.dissolve = 1.0 - Self::parse_f32(&mut tokens, line_num, command)?,
                "map_Kd" => {
                    let path: Vec<&str> = tokens.collect();
                    if path.is_empty() {
                        return Err(parse_error(line_num, "map_Kd missing texture path"));
                    }
                    mat.diffuse_map = Some(path.join(" "));
                }
                _ => {}
            }
        }

        if let Some(mat) = current {
            materials.insert(mat.name.clone(), mat);
        }

        Ok(materials)
    }

    fn parse_vec3<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<Vec3, AssetError>
    where
        I: Iterator<Item = &'a str>,
    {
        let r = Self::parse_f32(tokens, line_num, command)?;
        let g = Self::parse_f32(tokens, line_num, command)?;
        let b = Self::parse_f32(tokens, line_num, command)?;
        Ok(Vec3::new(r, g, b))
    }

    fn parse_f32<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<f32, AssetError>
    where
        I: Iterator<Item = &'a str>,
    {
        let token = tokens
            .next()
            .ok_or_else(|| parse_error(line_num, &format!("{command} missing value")))?;
        token
            .parse::<f32>()
            .map_err(|_| parse_error(line_num, &format!("{command} invalid float value '{token}'")))
    }
}

fn parse_error(line_num: usize, message: &str) -> AssetError {
    AssetError::Parse(format!("line {}: {}", line_num + 1, message))
}
