//! Forward renderer for the product scene.
//!
//! Shading is Lambert only: one directional light, flat ambient, and a
//! sky/ground hemisphere standing in for the environment map. Light values
//! follow the physical convention where diffuse is albedo / π.

use anyhow::{anyhow, Result};
use glam::{Mat3, Vec3};
use glow::HasContext;
use log::debug;
use std::f32::consts::PI;
use std::rc::Rc;

use super::gl::ShaderProgram;
use super::math::Color;
use crate::scene::light::Light;
use crate::scene::mesh::MeshVertex;
use crate::scene::Scene;

pub const MESH_UNIFORMS: &[&str] = &[
    "uModel",
    "uViewProj",
    "uNormalMatrix",
    "uBaseColor",
    "uAmbient",
    "uLightDir",
    "uLightColor",
    "uSky",
    "uGround",
];
pub const MESH_ATTRIBS: &[&str] = &["aPos", "aNormal"];

const DEFAULT_BACKGROUND: Color = Color::new(0.96, 0.95, 0.94, 1.0);

struct GpuMesh {
    vbo: glow::Buffer,
    vertex_count: i32,
    base_color: Color,
}

/// Per-frame light terms, already divided by π where they feed a Lambert BRDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    pub ambient: Vec3,
    pub light_dir: Vec3,
    pub light_color: Vec3,
    pub sky: Vec3,
    pub ground: Vec3,
}

impl SceneLighting {
    pub fn gather(scene: &Scene) -> Self {
        let mut ambient = Vec3::ZERO;
        let mut light_dir = Vec3::Y;
        let mut light_color = Vec3::ZERO;

        for (node, light) in scene.lights() {
            match light {
                Light::Ambient { .. } => ambient += light.radiance() / PI,
                Light::Directional { target, .. } => {
                    // Only the first directional light is shaded.
                    if light_color == Vec3::ZERO {
                        light_dir = (node.world_position() - *target).try_normalize().unwrap_or(Vec3::Y);
                        light_color = light.radiance() / PI;
                    }
                }
            }
        }

        let (sky, ground) = match scene.environment {
            Some(preset) => {
                let env = preset.lighting();
                (env.sky * env.intensity, env.ground * env.intensity)
            }
            None => (Vec3::ZERO, Vec3::ZERO),
        };

        Self {
            ambient,
            light_dir,
            light_color,
            sky,
            ground,
        }
    }
}

pub struct MeshRenderer {
    gl: Rc<glow::Context>,
    program: ShaderProgram,
    meshes: Vec<GpuMesh>,
}

impl MeshRenderer {
    pub fn new(gl: Rc<glow::Context>, program: ShaderProgram) -> Self {
        Self {
            gl,
            program,
            meshes: Vec::new(),
        }
    }

    /// Uploads every mesh in the scene, replacing anything uploaded before.
    /// Buffer slots line up with the scene's mesh ids.
    pub fn upload(&mut self, scene: &Scene) -> Result<()> {
        self.release();
        for mesh in scene.meshes() {
            let vbo = unsafe {
                self.gl
                    .create_buffer()
                    .map_err(|e| anyhow!("Failed to create buffer for mesh {}: {}", mesh.name, e))?
            };
            unsafe {
                self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
                self.gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(&mesh.vertices),
                    glow::STATIC_DRAW,
                );
            }
            self.meshes.push(GpuMesh {
                vbo,
                vertex_count: mesh.vertices.len() as i32,
                base_color: mesh.base_color,
            });
        }
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        debug!("Uploaded {} meshes", self.meshes.len());
        Ok(())
    }

    pub fn render(&self, scene: &Scene, viewport_px: [u32; 2]) {
        let gl = &self.gl;
        let background = scene.background.unwrap_or(DEFAULT_BACKGROUND);
        unsafe {
            gl.viewport(0, 0, viewport_px[0] as i32, viewport_px[1] as i32);
            gl.clear_color(background.r, background.g, background.b, background.a);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let Some((camera_node, camera)) = scene.camera() else {
            return;
        };
        let aspect = viewport_px[0] as f32 / viewport_px[1].max(1) as f32;
        let view_proj = camera.view_projection(camera_node.world_position(), aspect);
        let lighting = SceneLighting::gather(scene);

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.enable(glow::CULL_FACE);
            gl.use_program(Some(self.program.program));
        }
        let p = &self.program;
        p.set_mat4(gl, "uViewProj", &view_proj.to_cols_array());
        p.set_vec3(gl, "uAmbient", lighting.ambient.to_array());
        p.set_vec3(gl, "uLightDir", lighting.light_dir.to_array());
        p.set_vec3(gl, "uLightColor", lighting.light_color.to_array());
        p.set_vec3(gl, "uSky", lighting.sky.to_array());
        p.set_vec3(gl, "uGround", lighting.ground.to_array());

        let (transparent, opaque): (Vec<_>, Vec<_>) = scene
            .mesh_instances()
            .filter_map(|(world, id)| self.meshes.get(id.index()).map(|m| (world, m)))
            .partition(|(_, m)| m.base_color.a < 1.0);

        unsafe {
            gl.disable(glow::BLEND);
            gl.depth_mask(true);
        }
        for (world, mesh) in &opaque {
            self.draw_mesh(world, mesh);
        }

        if !transparent.is_empty() {
            unsafe {
                gl.enable(glow::BLEND);
                gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                gl.depth_mask(false);
            }
            for (world, mesh) in &transparent {
                self.draw_mesh(world, mesh);
            }
            unsafe {
                gl.depth_mask(true);
            }
        }

        unsafe {
            gl.disable(glow::CULL_FACE);
        }
    }

    fn draw_mesh(&self, world: &glam::Mat4, mesh: &GpuMesh) {
        let gl = &self.gl;
        let p = &self.program;
        let normal_matrix = Mat3::from_mat4(*world).inverse().transpose();
        p.set_mat4(gl, "uModel", &world.to_cols_array());
        p.set_mat3(gl, "uNormalMatrix", &normal_matrix.to_cols_array());
        p.set_vec4(gl, "uBaseColor", mesh.base_color.to_array());

        let stride = std::mem::size_of::<MeshVertex>() as i32;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(mesh.vbo));
            if let Some(a_pos) = p.attrib("aPos") {
                gl.enable_vertex_attrib_array(a_pos);
                gl.vertex_attrib_pointer_f32(a_pos, 3, glow::FLOAT, false, stride, 0);
            }
            if let Some(a_normal) = p.attrib("aNormal") {
                gl.enable_vertex_attrib_array(a_normal);
                gl.vertex_attrib_pointer_f32(a_normal, 3, glow::FLOAT, false, stride, 12);
            }
            gl.draw_arrays(glow::TRIANGLES, 0, mesh.vertex_count);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn release(&mut self) {
        for mesh in self.meshes.drain(..) {
            unsafe {
                self.gl.delete_buffer(mesh.vbo);
            }
        }
    }
}

impl Drop for MeshRenderer {
    fn drop(&mut self) {
        self.release();
        self.program.delete(&self.gl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::light::EnvironmentPreset;
    use crate::scene::NodeKind;

    #[test]
    fn lighting_divides_by_pi_and_points_at_light() {
        let mut scene = Scene::new();
        scene
            .build_node("sun")
            .with_position(Vec3::new(0.0, 2.0, 0.0))
            .with_kind(NodeKind::Light(Light::Directional {
                color: Color::new(1.0, 1.0, 1.0, 1.0),
                intensity: PI,
                target: Vec3::ZERO,
            }))
            .build();
        scene
            .build_node("fill")
            .with_kind(NodeKind::Light(Light::Ambient {
                color: Color::new(1.0, 0.5, 0.0, 1.0),
                intensity: 2.0 * PI,
            }))
            .build();
        scene.update_world_matrices();

        let l = SceneLighting::gather(&scene);
        assert!((l.light_dir - Vec3::Y).length() < 1e-6);
        assert!((l.light_color - Vec3::ONE).length() < 1e-6);
        assert!((l.ambient - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-6);
        assert_eq!(l.sky, Vec3::ZERO);
    }

    #[test]
    fn environment_feeds_hemisphere() {
        let mut scene = Scene::new();
        scene.environment = Some(EnvironmentPreset::Studio);
        let l = SceneLighting::gather(&scene);
        let env = EnvironmentPreset::Studio.lighting();
        assert_eq!(l.sky, env.sky * env.intensity);
        assert_eq!(l.light_color, Vec3::ZERO);
    }
}
