use glam::Vec3;

use crate::gfx::math::Color;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

/// Flattened triangle list: every three vertices form one triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub base_color: Color,
}

impl MeshData {
    pub fn new(name: &str, vertices: Vec<MeshVertex>, base_color: Color) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            base_color,
        }
    }

    /// Expands an indexed mesh. Missing normals are replaced by face normals.
    pub fn from_indexed(
        name: &str,
        positions: &[[f32; 3]],
        normals: Option<&[[f32; 3]]>,
        indices: &[u32],
        base_color: Color,
    ) -> Self {
        let mut vertices = Vec::with_capacity(indices.len());
        for tri in indices.chunks_exact(3) {
            let Some(corners) = tri
                .iter()
                .map(|i| positions.get(*i as usize).copied())
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };

            let face = face_normal(corners[0], corners[1], corners[2]);
            for (corner, index) in corners.iter().zip(tri) {
                let normal = normals
                    .and_then(|n| n.get(*index as usize).copied())
                    .unwrap_or(face);
                vertices.push(MeshVertex {
                    pos: *corner,
                    normal,
                });
            }
        }
        Self::new(name, vertices, base_color)
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_transparent(&self) -> bool {
        self.base_color.a < 1.0
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(name: &str, size: Vec3, base_color: Color) -> Self {
        let h = size * 0.5;
        let positions = [
            [-h.x, -h.y, h.z],
            [h.x, -h.y, h.z],
            [h.x, h.y, h.z],
            [-h.x, h.y, h.z],
            [-h.x, -h.y, -h.z],
            [h.x, -h.y, -h.z],
            [h.x, h.y, -h.z],
            [-h.x, h.y, -h.z],
        ];
        #[rustfmt::skip]
        let indices = [
            0, 1, 2, 0, 2, 3, // front
            5, 4, 7, 5, 7, 6, // back
            4, 0, 3, 4, 3, 7, // left
            1, 5, 6, 1, 6, 2, // right
            3, 2, 6, 3, 6, 7, // top
            4, 5, 1, 4, 1, 0, // bottom
        ];
        Self::from_indexed(name, &positions, None, &indices, base_color)
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let a = Vec3::from_array(a);
    let n = (Vec3::from_array(b) - a).cross(Vec3::from_array(c) - a);
    n.try_normalize().unwrap_or(Vec3::Y).to_array()
}
