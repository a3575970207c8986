//! Flat 2D drawing for everything layered over the 3D view.
//!
//! Geometry is collected into a [`Batch`] first so painting code never
//! touches GL, then [`DrawContext`] uploads and draws the batch in one call.

use super::gl::ShaderProgram;
use super::math::{Color, Rect};
use anyhow::{anyhow, Result};
use glow::HasContext;
use std::rc::Rc;

pub const UI_UNIFORMS: &[&str] = &["uViewport"];
pub const UI_ATTRIBS: &[&str] = &["aPos", "aColor"];

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

/// Stand-in glyph advance as a fraction of the line height.
const GLYPH_ASPECT: f32 = 0.5;
/// Height of a text bar as a fraction of the line height.
const BAR_FILL: f32 = 0.55;

#[derive(Debug, Clone, Default)]
pub struct Batch {
    vertices: Vec<Vertex>,
}

impl Batch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(1024),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn rect(&mut self, rect: Rect, color: Color) {
        if rect.w <= 0.0 || rect.h <= 0.0 || color.a <= 0.0 {
            return;
        }
        let (x, y, x2, y2) = (rect.x, rect.y, rect.right(), rect.bottom());
        let color = color.to_array();
        self.vertices.extend_from_slice(&[
            Vertex { pos: [x, y], color },
            Vertex { pos: [x2, y], color },
            Vertex { pos: [x2, y2], color },
            Vertex { pos: [x, y], color },
            Vertex { pos: [x2, y2], color },
            Vertex { pos: [x, y2], color },
        ]);
    }

    /// Rect with a border of `thickness` drawn inside its bounds.
    pub fn outline(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness.min(rect.w / 2.0).min(rect.h / 2.0);
        self.rect(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.rect(Rect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        self.rect(Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.rect(Rect::new(rect.right() - t, rect.y + t, t, rect.h - 2.0 * t), color);
    }

    /// Lays `text` out as one bar per word, wrapped to the width of `bounds`.
    /// Returns the height used.
    pub fn text(&mut self, bounds: Rect, text: &str, line_height: f32, color: Color) -> f32 {
        let advance = line_height * GLYPH_ASPECT;
        let bar_h = line_height * BAR_FILL;
        let bar_dy = (line_height - bar_h) / 2.0;

        let mut x = bounds.x;
        let mut y = bounds.y;
        let mut lines = 0;
        for word in text.split_whitespace() {
            let w = (word.chars().count() as f32 * advance).min(bounds.w);
            if lines == 0 {
                lines = 1;
            } else if x + w > bounds.right() {
                x = bounds.x;
                y += line_height;
                lines += 1;
            }
            self.rect(Rect::new(x, y + bar_dy, w, bar_h), color);
            x += w + advance;
        }
        lines as f32 * line_height
    }

    /// Single line of text centered in `bounds`.
    pub fn label(&mut self, bounds: Rect, text: &str, line_height: f32, color: Color) {
        let advance = line_height * GLYPH_ASPECT;
        let chars = text.chars().count() as f32;
        let width = (chars * advance).min(bounds.w);
        let x = bounds.x + (bounds.w - width) / 2.0;
        let y = bounds.y + (bounds.h - line_height) / 2.0;
        self.text(Rect::new(x, y, width, line_height), text, line_height, color);
    }
}

pub struct DrawContext {
    gl: Rc<glow::Context>,
    program: ShaderProgram,
    vbo: glow::Buffer,
    viewport: [f32; 2],
}

impl DrawContext {
    pub fn new(gl: Rc<glow::Context>, program: ShaderProgram) -> Result<Self> {
        let vbo = unsafe {
            gl.create_buffer()
                .map_err(|e| anyhow!("Failed to create buffer: {}", e))?
        };

        Ok(Self {
            gl,
            program,
            vbo,
            viewport: [800.0, 600.0],
        })
    }

    /// Prepares GL state for overlay drawing. `logical` is the size the
    /// batch coordinates are expressed in; the shader maps it to clip space.
    pub fn begin(&mut self, logical: [f32; 2]) {
        self.viewport = logical;
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.depth_mask(true);
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            self.gl.use_program(Some(self.program.program));
        }
        self.program.set_vec2(&self.gl, "uViewport", logical);
    }

    pub fn draw(&mut self, batch: &Batch) {
        if batch.is_empty() {
            return;
        }

        let stride = std::mem::size_of::<Vertex>() as i32;
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(batch.vertices()),
                glow::DYNAMIC_DRAW,
            );

            if let Some(a_pos) = self.program.attrib("aPos") {
                self.gl.enable_vertex_attrib_array(a_pos);
                self.gl.vertex_attrib_pointer_f32(a_pos, 2, glow::FLOAT, false, stride, 0);
            }
            if let Some(a_color) = self.program.attrib("aColor") {
                self.gl.enable_vertex_attrib_array(a_color);
                self.gl.vertex_attrib_pointer_f32(a_color, 4, glow::FLOAT, false, stride, 8);
            }

            self.gl.draw_arrays(glow::TRIANGLES, 0, batch.vertices().len() as i32);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }
}

impl Drop for DrawContext {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
        }
        self.program.delete(&self.gl);
    }
}
