//! Assembly of the product page scene.
//!
//! ```text
//! camera
//! directional light
//! ambient light
//! scroll region (pages, damping)
//! └── model            <- pose written by the scroll binder
//!     └── <imported nodes>
//! ```

use glam::Vec3;

use super::camera::Camera;
use super::light::Light;
use super::{NodeIndex, NodeKind, Scene, ScrollRegion};
use crate::config::{CameraConfig, LightingConfig, ScrollConfig};
use crate::gfx::math::Color;
use crate::model::LoadedModel;

pub const MODEL_NODE: &str = "model";

pub struct ProductScene {
    pub scene: Scene,
    pub camera: NodeIndex,
    pub region: NodeIndex,
    /// Group whose pose follows the keyframe timeline.
    pub model: NodeIndex,
}

pub fn compose(
    camera: &CameraConfig,
    lighting: &LightingConfig,
    scroll: &ScrollConfig,
    model: LoadedModel,
) -> ProductScene {
    let mut scene = Scene::new();
    scene.environment = Some(lighting.environment);

    let camera_node = scene
        .build_node("camera")
        .with_position(Vec3::from_array(camera.position))
        .with_kind(NodeKind::Camera(Camera {
            fov: camera.fov,
            near: camera.near,
            far: camera.far,
            target: Vec3::from_array(camera.target),
        }))
        .build();

    let white = Color::new(1.0, 1.0, 1.0, 1.0);
    scene
        .build_node("directional_light")
        .with_position(Vec3::from_array(lighting.directional_position))
        .with_kind(NodeKind::Light(Light::Directional {
            color: white,
            intensity: lighting.directional_intensity,
            target: Vec3::ZERO,
        }))
        .build();
    scene
        .build_node("ambient_light")
        .with_kind(NodeKind::Light(Light::Ambient {
            color: white,
            intensity: lighting.ambient_intensity,
        }))
        .build();

    let region = scene
        .build_node("scroll_region")
        .with_kind(NodeKind::ScrollRegion(ScrollRegion {
            pages: scroll.pages,
            damping: scroll.damping,
        }))
        .build();
    let model_node = scene.build_node(MODEL_NODE).with_parent(region).build();

    attach_model(&mut scene, model, model_node);
    scene.update_world_matrices();

    ProductScene {
        scene,
        camera: camera_node,
        region,
        model: model_node,
    }
}

/// Copies imported nodes under `parent`, preserving their hierarchy.
fn attach_model(scene: &mut Scene, model: LoadedModel, parent: NodeIndex) {
    let mesh_ids: Vec<_> = model.meshes.into_iter().map(|m| scene.add_mesh(m)).collect();

    let mut stack: Vec<(usize, NodeIndex)> = model.roots.iter().rev().map(|r| (*r, parent)).collect();
    let mut visited = vec![false; model.nodes.len()];

    while let Some((idx, parent)) = stack.pop() {
        let Some(node) = model.nodes.get(idx) else {
            continue;
        };
        if std::mem::replace(&mut visited[idx], true) {
            continue;
        }

        let created = scene
            .build_node(&node.name)
            .with_transform(node.transform)
            .with_parent(parent)
            .build();

        for mesh in &node.meshes {
            if let Some(id) = mesh_ids.get(*mesh) {
                scene
                    .build_node(&node.name)
                    .with_kind(NodeKind::Mesh(*id))
                    .with_parent(created)
                    .build();
            }
        }

        stack.extend(node.children.iter().rev().map(|c| (*c, created)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scene::light::EnvironmentPreset;

    fn product() -> ProductScene {
        let config = Config::default();
        compose(&config.camera, &config.lighting, &config.scroll, LoadedModel::placeholder())
    }

    #[test]
    fn composes_camera_lights_and_region() {
        let p = product();
        let (node, camera) = p.scene.camera().unwrap();
        assert_eq!(camera.fov, 65.0);
        assert_eq!(node.world_position(), Vec3::new(2.3, 1.5, 2.3));

        let lights: Vec<_> = p.scene.lights().map(|(_, l)| *l).collect();
        assert_eq!(lights.len(), 2);
        assert!(lights.iter().any(|l| matches!(l, Light::Ambient { intensity, .. } if *intensity == 6.0)));
        assert!(lights.iter().any(|l| matches!(l, Light::Directional { .. })));

        assert_eq!(p.scene.environment, Some(EnvironmentPreset::City));
        let (region, settings) = p.scene.scroll_region().unwrap();
        assert_eq!(region, p.region);
        assert_eq!(settings.pages, 6.0);
        assert_eq!(p.scene.node(p.model).unwrap().parent(), Some(p.region));
    }

    #[test]
    fn model_meshes_hang_under_model_group() {
        let p = product();
        assert_eq!(p.scene.mesh_instances().count(), 2);
        assert_eq!(p.scene.meshes().len(), 2);

        let placeholder = p.scene.find("placeholder").unwrap();
        assert_eq!(p.scene.node(placeholder).unwrap().parent(), Some(p.model));
    }

    #[test]
    fn model_pose_moves_meshes() {
        let mut p = product();
        p.scene.node_mut(p.model).unwrap().transform.pose.position.x = 1.0;
        p.scene.update_world_matrices();
        let head = p.scene.find("placeholder_head").unwrap();
        let pos = p.scene.node(head).unwrap().world_position();
        assert!((pos - Vec3::new(1.0, 0.9, 0.0)).length() < 1e-5);
    }

    #[test]
    fn cyclic_model_nodes_are_visited_once() {
        let mut model = LoadedModel::placeholder();
        model.nodes[1].children.push(0);
        let config = Config::default();
        let p = compose(&config.camera, &config.lighting, &config.scroll, model);
        assert_eq!(p.scene.mesh_instances().count(), 2);
    }
}
