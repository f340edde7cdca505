//! OpenGL card renderer.
//!
//! Draws the scene plan built by the gallery shell: a list of tinted,
//! optionally textured unit quads, already sorted for blending. Owns every
//! GPU resource it creates (program, quad buffers, texture arena) and frees
//! them in `destroy()`; the texture arena is rebuilt wholesale whenever the
//! display-set generation changes, never patched incrementally.

use eframe::glow::{self, HasContext};
use glam::Mat4;
use log::{error, info, trace};

use super::pixmap::Pixmap;
use super::shaders::{FRAGMENT_SHADER, VERTEX_SHADER};

/// One quad to draw: model-view-projection, tint, optional texture slot.
#[derive(Clone, Copy, Debug)]
pub struct QuadDraw {
    pub mvp: Mat4,
    pub tint: [f32; 4],
    pub texture_slot: Option<usize>,
}

/// Everything the renderer needs for one frame, built off the GL thread.
///
/// `uploads` carries freshly decoded pixmaps destined for arena slots;
/// a `generation` bump empties and resizes the whole arena first, so a
/// resample swaps all card textures atomically.
#[derive(Clone, Debug, Default)]
pub struct ScenePlan {
    pub generation: u64,
    pub slot_count: usize,
    pub uploads: Vec<(usize, Pixmap)>,
    pub quads: Vec<QuadDraw>,
}

/// OpenGL renderer for the card gallery.
pub struct CardRenderer {
    program: Option<glow::Program>,
    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
    textures: Vec<Option<glow::Texture>>,
    generation: u64,
    // Last shader error message (if any)
    last_error: Option<String>,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CardRenderer {
    pub fn new() -> Self {
        Self {
            program: None,
            vao: None,
            vbo: None,
            textures: Vec::new(),
            generation: 0,
            last_error: None,
        }
    }

    /// Compile shaders and create the shared unit-quad buffers.
    fn initialize(&mut self, gl: &glow::Context) {
        unsafe {
            let vertex_shader = match gl.create_shader(glow::VERTEX_SHADER) {
                Ok(shader) => shader,
                Err(e) => {
                    let msg = format!("Failed to create vertex shader: {e}");
                    self.last_error = Some(msg.clone());
                    error!("{msg}");
                    return;
                }
            };
            gl.shader_source(vertex_shader, VERTEX_SHADER);
            gl.compile_shader(vertex_shader);

            if !gl.get_shader_compile_status(vertex_shader) {
                let log = gl.get_shader_info_log(vertex_shader);
                let msg = format!("Vertex shader compilation failed: {log}");
                self.last_error = Some(msg.clone());
                error!("{msg}");
                gl.delete_shader(vertex_shader);
                return;
            }

            let fragment_shader = match gl.create_shader(glow::FRAGMENT_SHADER) {
                Ok(shader) => shader,
                Err(e) => {
                    let msg = format!("Failed to create fragment shader: {e}");
                    self.last_error = Some(msg.clone());
                    error!("{msg}");
                    gl.delete_shader(vertex_shader);
                    return;
                }
            };
            gl.shader_source(fragment_shader, FRAGMENT_SHADER);
            gl.compile_shader(fragment_shader);

            if !gl.get_shader_compile_status(fragment_shader) {
                let log = gl.get_shader_info_log(fragment_shader);
                let msg = format!("Fragment shader compilation failed: {log}");
                self.last_error = Some(msg.clone());
                error!("{msg}");
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                return;
            }

            let program = match gl.create_program() {
                Ok(p) => p,
                Err(e) => {
                    let msg = format!("Failed to create shader program: {e}");
                    self.last_error = Some(msg.clone());
                    error!("{msg}");
                    gl.delete_shader(vertex_shader);
                    gl.delete_shader(fragment_shader);
                    return;
                }
            };
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                let msg = format!("Shader program linking failed: {log}");
                self.last_error = Some(msg.clone());
                error!("{msg}");
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                gl.delete_program(program);
                return;
            }

            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);

            self.program = Some(program);
            self.last_error = None;

            // Unit quad: position (vec2) + uv (vec2), centered at origin.
            if self.vao.is_none() {
                let vao = match gl.create_vertex_array() {
                    Ok(arr) => arr,
                    Err(e) => {
                        error!("Failed to create vertex array: {e}");
                        return;
                    }
                };
                gl.bind_vertex_array(Some(vao));

                let vbo = match gl.create_buffer() {
                    Ok(buf) => buf,
                    Err(e) => {
                        error!("Failed to create buffer: {e}");
                        return;
                    }
                };
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));

                #[rustfmt::skip]
                let vertices: [f32; 16] = [
                    // pos.x, pos.y, uv.x, uv.y
                    -0.5, -0.5,  0.0, 1.0,  // bottom-left
                     0.5, -0.5,  1.0, 1.0,  // bottom-right
                     0.5,  0.5,  1.0, 0.0,  // top-right
                    -0.5,  0.5,  0.0, 0.0,  // top-left
                ];

                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(&vertices),
                    glow::STATIC_DRAW,
                );

                gl.enable_vertex_attrib_array(0);
                gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 16, 0);
                gl.enable_vertex_attrib_array(1);
                gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, 16, 8);

                gl.bind_vertex_array(None);

                self.vao = Some(vao);
                self.vbo = Some(vbo);
            }

            info!("CardRenderer initialized successfully");
        }
    }

    /// Rebuild the texture arena for a new display-set generation.
    ///
    /// Deletes every texture of the old generation and leaves `slot_count`
    /// empty slots; uploads then fill them as decodes arrive.
    fn rebuild_arena(&mut self, gl: &glow::Context, generation: u64, slot_count: usize) {
        unsafe {
            for tex in self.textures.iter_mut() {
                if let Some(tex) = tex.take() {
                    gl.delete_texture(tex);
                }
            }
        }
        self.textures.clear();
        self.textures.resize(slot_count, None);
        self.generation = generation;
        trace!("Texture arena rebuilt: generation {generation}, {slot_count} slots");
    }

    /// Upload one pixmap into an arena slot, replacing any previous texture.
    fn upload_slot(&mut self, gl: &glow::Context, slot: usize, pixmap: &Pixmap) {
        if slot >= self.textures.len() {
            error!("Texture upload to out-of-range slot {slot}");
            return;
        }
        unsafe {
            if let Some(old) = self.textures[slot].take() {
                gl.delete_texture(old);
            }
            let texture = match gl.create_texture() {
                Ok(t) => t,
                Err(e) => {
                    error!("Failed to create texture for slot {slot}: {e}");
                    return;
                }
            };
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                pixmap.width() as i32,
                pixmap.height() as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixmap.as_bytes())),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);
            self.textures[slot] = Some(texture);
        }
    }

    /// Return the last shader error message, if any
    pub fn shader_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    /// Apply uploads and draw the frame's quads.
    pub fn paint(&mut self, gl: &glow::Context, plan: &ScenePlan) {
        if self.program.is_none() {
            self.initialize(gl);
        }

        if plan.generation != self.generation {
            self.rebuild_arena(gl, plan.generation, plan.slot_count);
        }
        for (slot, pixmap) in &plan.uploads {
            self.upload_slot(gl, *slot, pixmap);
        }

        let program = match self.program {
            Some(p) => p,
            None => return,
        };
        let vao = match self.vao {
            Some(v) => v,
            None => return,
        };
        if plan.quads.is_empty() {
            return; // Degenerate input: nothing to draw, not an error.
        }

        unsafe {
            gl.use_program(Some(program));
            gl.bind_vertex_array(Some(vao));

            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            // Quads arrive depth-sorted; blending replaces the depth buffer.
            gl.disable(glow::DEPTH_TEST);

            let mvp_loc = gl.get_uniform_location(program, "u_mvp");
            let tint_loc = gl.get_uniform_location(program, "u_tint");
            let use_tex_loc = gl.get_uniform_location(program, "u_use_texture");
            let tex_loc = gl.get_uniform_location(program, "u_texture");

            gl.active_texture(glow::TEXTURE0);
            if let Some(loc) = &tex_loc {
                gl.uniform_1_i32(Some(loc), 0);
            }

            for quad in &plan.quads {
                if let Some(loc) = &mvp_loc {
                    gl.uniform_matrix_4_f32_slice(Some(loc), false, &quad.mvp.to_cols_array());
                }
                if let Some(loc) = &tint_loc {
                    gl.uniform_4_f32_slice(Some(loc), &quad.tint);
                }

                let texture = quad
                    .texture_slot
                    .and_then(|slot| self.textures.get(slot).copied().flatten());
                if let Some(loc) = &use_tex_loc {
                    gl.uniform_1_i32(Some(loc), texture.is_some() as i32);
                }
                gl.bind_texture(glow::TEXTURE_2D, texture);

                gl.draw_arrays(glow::TRIANGLE_FAN, 0, 4);
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    /// Cleanup OpenGL resources
    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            for tex in self.textures.iter_mut() {
                if let Some(tex) = tex.take() {
                    gl.delete_texture(tex);
                }
            }
            if let Some(vbo) = self.vbo.take() {
                gl.delete_buffer(vbo);
            }
            if let Some(vao) = self.vao.take() {
                gl.delete_vertex_array(vao);
            }
            if let Some(program) = self.program.take() {
                gl.delete_program(program);
            }
        }
        self.textures.clear();
    }
}

impl Drop for CardRenderer {
    fn drop(&mut self) {
        // Note: Cannot safely cleanup OpenGL resources here without context
        // Must call destroy() explicitly before dropping
        if self.program.is_some() {
            error!("CardRenderer dropped without calling destroy()");
        }
    }
}
