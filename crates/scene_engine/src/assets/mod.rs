//! Asset loading
//!
//! Imports Wavefront OBJ models with their MTL materials and PNG textures.
//! Loading never stops the frame loop: a missing or broken model becomes an
//! empty model and a missing texture leaves its group untextured, each with a
//! warning in the log.

pub mod mtl_parser;
pub mod obj_importer;
pub mod texture;

pub use mtl_parser::{MtlData, MtlParser};
pub use obj_importer::{ObjData, ObjGroup, ObjImporter};
pub use texture::TextureImage;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::core::config::AssetConfig;
use crate::render::{Material, Mesh};

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed file contents
    #[error("Parse error: {0}")]
    Parse(String),

    /// Decoder failure
    #[error("Load failed: {0}")]
    LoadFailed(String),
}

/// Colour properties and optional texture of one imported material
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMaterial {
    /// Name from the MTL file
    pub name: String,
    /// Fixed-function colours
    pub material: Material,
    /// Decoded diffuse texture
    pub texture: Option<Rc<TextureImage>>,
}

/// A sub-mesh with the index of its material
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    /// Triangle geometry
    pub mesh: Mesh,
    /// Index into [`ImportedModel::materials`]
    pub material_index: Option<usize>,
}

/// A model ready to be attached to scene nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedModel {
    /// Sub-meshes in file order
    pub groups: Vec<ModelGroup>,
    /// Materials referenced by the groups
    pub materials: Vec<ImportedMaterial>,
}

impl ImportedModel {
    /// True if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total triangle count
    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.mesh.triangle_count()).sum()
    }

    /// Material of a group, if it has a valid one
    pub fn group_material(&self, group: &ModelGroup) -> Option<&ImportedMaterial> {
        group.material_index.and_then(|i| self.materials.get(i))
    }
}

/// Loads models relative to the configured asset directory
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    /// Create a loader for the configured asset directory
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            root: PathBuf::from(&config.assets_dir),
        }
    }

    /// Resolve a path against the asset directory
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Import a model, propagating any failure
    pub fn try_load_model(&self, path: impl AsRef<Path>) -> Result<ImportedModel, AssetError> {
        let path = self.resolve(path);
        let contents = std::fs::read_to_string(&path)?;
        let obj = ObjImporter::parse(&contents)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let model = Self::assemble(obj, &base);
        log::info!(
            "Imported {:?}: {} group(s), {} triangle(s), {} material(s)",
            path,
            model.groups.len(),
            model.triangle_count(),
            model.materials.len()
        );
        Ok(model)
    }

    /// Import a model, falling back to an empty one on failure
    pub fn load_model(&self, path: impl AsRef<Path>) -> Rc<ImportedModel> {
        let path = path.as_ref();
        match self.try_load_model(path) {
            Ok(model) => Rc::new(model),
            Err(e) => {
                log::warn!("Model {:?} unavailable, drawing nothing: {}", path, e);
                Rc::new(ImportedModel::default())
            }
        }
    }

    /// Resolve material names against the model's libraries and load textures
    pub fn assemble(obj: ObjData, base: &Path) -> ImportedModel {
        let mut library = std::collections::HashMap::new();
        for lib in &obj.material_libraries {
            let lib_path = base.join(lib);
            let parsed = std::fs::read_to_string(&lib_path)
                .map_err(AssetError::from)
                .and_then(|text| MtlParser::parse(&text));
            match parsed {
                Ok(materials) => library.extend(materials),
                Err(e) => log::warn!("Material library {:?} unavailable: {}", lib_path, e),
            }
        }

        let mut materials: Vec<ImportedMaterial> = Vec::new();
        let mut groups = Vec::with_capacity(obj.groups.len());
        for group in obj.groups {
            let material_index = group.material.as_ref().and_then(|name| {
                if let Some(existing) = materials.iter().position(|m| &m.name == name) {
                    return Some(existing);
                }
                let Some(data) = library.get(name) else {
                    log::warn!("Material '{}' not found in any library", name);
                    return None;
                };
                materials.push(ImportedMaterial {
                    name: name.clone(),
                    material: data.to_material(),
                    texture: data.diffuse_map.as_ref().and_then(|map| load_texture(&base.join(map))),
                });
                Some(materials.len() - 1)
            });
            groups.push(ModelGroup {
                mesh: group.mesh,
                material_index,
            });
        }

        ImportedModel { groups, materials }
    }
}

fn load_texture(path: &Path) -> Option<Rc<TextureImage>> {
    match TextureImage::from_file(path) {
        Ok(texture) => Some(Rc::new(texture)),
        Err(e) => {
            log::warn!("Texture {:?} unavailable, group stays untextured: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_falls_back_to_empty() {
        let loader = AssetLoader::new(&AssetConfig::new().with_assets_dir("does/not/exist"));
        let model = loader.load_model("car.obj");
        assert!(model.is_empty());
        assert!(matches!(loader.try_load_model("car.obj"), Err(AssetError::Io(_))));
    }

    #[test]
    fn test_unknown_materials_leave_groups_unassigned() {
        let obj = ObjImporter::parse("mtllib missing.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Paint\nf 1 2 3\n")
            .unwrap();
        let model = AssetLoader::assemble(obj, Path::new("does/not/exist"));
        assert_eq!(model.groups.len(), 1);
        assert_eq!(model.groups[0].material_index, None);
        assert!(model.materials.is_empty());
    }

    #[test]
    fn test_model_with_library_on_disk() {
        let dir = std::env::temp_dir().join(format!("scene_engine_assets_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("sign.mtl"), "newmtl Neon\nKd 0 0 0\nKe 0 1 1\nmap_Kd missing.png\n").unwrap();
        std::fs::write(
            dir.join("sign.obj"),
            "mtllib sign.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Neon\nf 1 2 3\nusemtl Neon\nf 3 2 1\n",
        )
        .unwrap();

        let loader = AssetLoader::new(&AssetConfig::new().with_assets_dir(dir.to_string_lossy()));
        let model = loader.try_load_model("sign.obj").unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(model.groups.len(), 2);
        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.groups[1].material_index, Some(0));
        let neon = &model.materials[0];
        assert_eq!(neon.material.emission, [0.0, 1.0, 1.0, 1.0]);
        assert!(neon.texture.is_none());
    }
}
