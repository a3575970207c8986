use anyhow::{anyhow, bail, Context, Result};
use glow::HasContext;
use std::collections::HashMap;
use std::path::Path;

pub fn compile_shader(gl: &glow::Context, shader_type: u32, source: &str) -> Result<glow::Shader> {
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|e| anyhow!("Failed to create shader: {}", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let info = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            bail!("Shader compilation failed: {}", info);
        }

        Ok(shader)
    }
}

pub fn link_program(
    gl: &glow::Context,
    vertex_shader: glow::Shader,
    fragment_shader: glow::Shader,
) -> Result<glow::Program> {
    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| anyhow!("Failed to create program: {}", e))?;
        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let info = gl.get_program_info_log(program);
            gl.delete_program(program);
            bail!("Program linking failed: {}", info);
        }

        gl.detach_shader(program, vertex_shader);
        gl.detach_shader(program, fragment_shader);

        Ok(program)
    }
}

/// A linked program with its attribute and uniform locations resolved once.
pub struct ShaderProgram {
    pub program: glow::Program,
    uniforms: HashMap<&'static str, glow::UniformLocation>,
    attribs: HashMap<&'static str, u32>,
}

impl ShaderProgram {
    pub fn new(
        gl: &glow::Context,
        vert_src: &str,
        frag_src: &str,
        uniforms: &[&'static str],
        attribs: &[&'static str],
    ) -> Result<Self> {
        let vertex_shader = compile_shader(gl, glow::VERTEX_SHADER, vert_src)?;
        let fragment_shader = compile_shader(gl, glow::FRAGMENT_SHADER, frag_src)?;
        let linked = link_program(gl, vertex_shader, fragment_shader);
        unsafe {
            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);
        }
        let program = linked?;

        // Unused uniforms are optimized out by the driver; that is not an error.
        let uniforms = uniforms
            .iter()
            .filter_map(|name| unsafe { gl.get_uniform_location(program, name) }.map(|loc| (*name, loc)))
            .collect();
        let attribs = attribs
            .iter()
            .filter_map(|name| unsafe { gl.get_attrib_location(program, name) }.map(|loc| (*name, loc)))
            .collect();

        Ok(Self {
            program,
            uniforms,
            attribs,
        })
    }

    /// Reads `<dir>/<name>.vert.glsl` and `<dir>/<name>.frag.glsl`.
    pub fn from_files(
        gl: &glow::Context,
        dir: &Path,
        name: &str,
        uniforms: &[&'static str],
        attribs: &[&'static str],
    ) -> Result<Self> {
        let vert_path = dir.join(format!("{name}.vert.glsl"));
        let frag_path = dir.join(format!("{name}.frag.glsl"));
        let vert_src = std::fs::read_to_string(&vert_path)
            .with_context(|| format!("Failed to read {}", vert_path.display()))?;
        let frag_src = std::fs::read_to_string(&frag_path)
            .with_context(|| format!("Failed to read {}", frag_path.display()))?;
        Self::new(gl, &vert_src, &frag_src, uniforms, attribs)
            .with_context(|| format!("Failed to build shader program {name}"))
    }

    pub fn uniform(&self, name: &str) -> Option<&glow::UniformLocation> {
        self.uniforms.get(name)
    }

    pub fn attrib(&self, name: &str) -> Option<u32> {
        self.attribs.get(name).copied()
    }

    pub fn set_f32(&self, gl: &glow::Context, name: &str, v: f32) {
        if let Some(loc) = self.uniform(name) {
            unsafe { gl.uniform_1_f32(Some(loc), v) }
        }
    }

    pub fn set_vec2(&self, gl: &glow::Context, name: &str, v: [f32; 2]) {
        if let Some(loc) = self.uniform(name) {
            unsafe { gl.uniform_2_f32(Some(loc), v[0], v[1]) }
        }
    }

    pub fn set_vec3(&self, gl: &glow::Context, name: &str, v: [f32; 3]) {
        if let Some(loc) = self.uniform(name) {
            unsafe { gl.uniform_3_f32(Some(loc), v[0], v[1], v[2]) }
        }
    }

    pub fn set_vec4(&self, gl: &glow::Context, name: &str, v: [f32; 4]) {
        if let Some(loc) = self.uniform(name) {
            unsafe { gl.uniform_4_f32(Some(loc), v[0], v[1], v[2], v[3]) }
        }
    }

    pub fn set_mat3(&self, gl: &glow::Context, name: &str, m: &[f32; 9]) {
        if let Some(loc) = self.uniform(name) {
            unsafe { gl.uniform_matrix_3_f32_slice(Some(loc), false, m) }
        }
    }

    pub fn set_mat4(&self, gl: &glow::Context, name: &str, m: &[f32; 16]) {
        if let Some(loc) = self.uniform(name) {
            unsafe { gl.uniform_matrix_4_f32_slice(Some(loc), false, m) }
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) }
    }
}
