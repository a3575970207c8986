//! glTF model loading.

use anyhow::{Context, Result};
use glam::{EulerRot, Quat, Vec3};
use log::{debug, info, warn};
use std::path::Path;

use crate::gfx::math::Color;
use crate::scene::mesh::MeshData;
use crate::scene::Transform;
use crate::timeline::Pose;

#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    /// Indices into [`LoadedModel::meshes`], one per primitive.
    pub meshes: Vec<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub meshes: Vec<MeshData>,
    pub nodes: Vec<ModelNode>,
    pub roots: Vec<usize>,
}

impl LoadedModel {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Stand-in shown when the product asset is unavailable: a slim
    /// handheld body with a wider head.
    pub fn placeholder() -> Self {
        let body = MeshData::cuboid(
            "placeholder_body",
            Vec3::new(0.35, 1.6, 0.35),
            Color::rgba(0xd9, 0xd6, 0xd2, 0xff),
        );
        let head = MeshData::cuboid(
            "placeholder_head",
            Vec3::new(0.45, 0.2, 0.45),
            Color::rgba(0x3a, 0x3a, 0x3a, 0xff),
        );
        let mut head_transform = Transform::default();
        head_transform.pose.position = Vec3::new(0.0, 0.9, 0.0);

        LoadedModel {
            meshes: vec![body, head],
            nodes: vec![
                ModelNode {
                    name: "placeholder".into(),
                    transform: Transform::default(),
                    meshes: vec![0],
                    children: vec![1],
                },
                ModelNode {
                    name: "placeholder_head".into(),
                    transform: head_transform,
                    meshes: vec![1],
                    children: Vec::new(),
                },
            ],
            roots: vec![0],
        }
    }
}

pub fn load(path: &Path) -> Result<LoadedModel> {
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import model {}", path.display()))?;

    let mut model = LoadedModel::default();

    for node in document.nodes() {
        let (translation, rotation, scale) = node.transform().decomposed();
        let (rx, ry, rz) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);

        let mut meshes = Vec::new();
        if let Some(mesh) = node.mesh() {
            let mesh_name = mesh.name().unwrap_or("mesh").to_string();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    debug!("Skipping non-triangle primitive in {}", mesh_name);
                    continue;
                }

                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
                let Some(positions) = reader.read_positions() else {
                    warn!("Primitive in {} has no positions", mesh_name);
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..positions.len() as u32).collect(),
                };

                let material = primitive.material();
                let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();
                let alpha = match material.alpha_mode() {
                    gltf::material::AlphaMode::Blend => a,
                    _ => 1.0,
                };

                let data = MeshData::from_indexed(
                    material.name().unwrap_or(mesh_name.as_str()),
                    &positions,
                    normals.as_deref(),
                    &indices,
                    Color::new(r, g, b, alpha),
                );
                if data.triangle_count() > 0 {
                    model.meshes.push(data);
                    meshes.push(model.meshes.len() - 1);
                }
            }
        }

        model.nodes.push(ModelNode {
            name: node.name().unwrap_or("node").to_string(),
            transform: Transform {
                pose: Pose {
                    rotation: Vec3::new(rx, ry, rz),
                    position: Vec3::from_array(translation),
                },
                scale: Vec3::from_array(scale),
            },
            meshes,
            children: node.children().map(|c| c.index()).collect(),
        });
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("Model has no scene")?;
    model.roots = scene.nodes().map(|n| n.index()).collect();

    if model.triangle_count() == 0 {
        anyhow::bail!("Model {} contains no triangle geometry", path.display());
    }

    info!(
        "Loaded model {}: {} nodes, {} meshes, {} triangles",
        path.display(),
        model.nodes.len(),
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

/// Loads the model, falling back to [`LoadedModel::placeholder`].
pub fn load_or_placeholder(path: &Path) -> LoadedModel {
    match load(path) {
        Ok(model) => model,
        Err(e) => {
            warn!("{:#}; showing placeholder model", e);
            LoadedModel::placeholder()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_placeholder() {
        let model = load_or_placeholder(Path::new("does/not/exist.glb"));
        assert_eq!(model.roots, vec![0]);
        assert_eq!(model.nodes[0].name, "placeholder");
        assert_eq!(model.triangle_count(), 24);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("does/not/exist.glb")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.glb"));
    }
}
