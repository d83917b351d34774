use crate::{
    CrtError, GlContext, ShaderStage, ShaderVersion,
    kernel::{BLUR_OFFSETS, BLUR_WEIGHTS},
    misc_util::{compile_shader, link_program},
};

pub(crate) const VERT_SRC: &str = include_str!("shader/crt_vertex.glsl");
pub(crate) const FRAG_SRC: &str = include_str!("shader/crt_fragment.glsl");

/// Name of the vertex position attribute.
pub(crate) const A_POS: &str = "a_pos";

/// The values that change from draw to draw.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameUniforms {
    /// Source size in pixels.
    pub width: f32,
    pub height: f32,

    /// The row (counted from the top) that gets the bright scan band.
    pub scanline: f32,
}

/// The linked CRT program and where its inputs live.
///
/// Locations are looked up once, right after linking.
pub(crate) struct CrtProgram<G: GlContext> {
    program: G::Program,
    a_pos: u32,
    u_sampler: Option<G::UniformLocation>,
    u_width: Option<G::UniformLocation>,
    u_height: Option<G::UniformLocation>,
    u_scanline: Option<G::UniformLocation>,
}

impl<G: GlContext> CrtProgram<G> {
    /// Compile and link the given sources, each prefixed with the header for `shader_version`
    /// and one `#define` per entry of `defines`.
    pub(crate) fn new(
        gl: &G,
        shader_version: ShaderVersion,
        defines: &[&str],
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, CrtError> {
        profiling::function_scope!();

        let header = shader_version.shader_prefix(defines);

        let vert = compile_shader(gl, ShaderStage::Vertex, &format!("{header}{vertex_src}"))?;
        let frag = match compile_shader(gl, ShaderStage::Fragment, &format!("{header}{fragment_src}"))
        {
            Ok(frag) => frag,
            Err(err) => {
                gl.delete_shader(vert);
                return Err(err);
            }
        };

        let linked = link_program(gl, &[vert, frag]);
        gl.delete_shader(vert);
        gl.delete_shader(frag);
        let program = linked?;

        let Some(a_pos) = gl.get_attrib_location(program, A_POS) else {
            gl.delete_program(program);
            return Err(CrtError::MissingAttribute(A_POS));
        };

        let u_sampler = gl.get_uniform_location(program, "u_sampler");
        let u_width = gl.get_uniform_location(program, "u_width");
        let u_height = gl.get_uniform_location(program, "u_height");
        let u_scanline = gl.get_uniform_location(program, "u_scanline");
        let u_offset = gl.get_uniform_location(program, "u_offset");
        let u_weight = gl.get_uniform_location(program, "u_weight");

        // The kernel never changes, and uniform values live in the program object:
        gl.use_program(Some(program));
        gl.uniform_1_f32_slice(u_offset.as_ref(), &BLUR_OFFSETS);
        gl.uniform_1_f32_slice(u_weight.as_ref(), &BLUR_WEIGHTS);
        gl.use_program(None);

        Ok(Self {
            program,
            a_pos,
            u_sampler,
            u_width,
            u_height,
            u_scanline,
        })
    }

    pub(crate) fn a_pos(&self) -> u32 {
        self.a_pos
    }

    /// Make the program current and upload the per-draw uniforms.
    ///
    /// The source texture is expected on texture unit 0.
    pub(crate) fn bind(&self, gl: &G, uniforms: &FrameUniforms) {
        gl.use_program(Some(self.program));
        gl.uniform_1_i32(self.u_sampler.as_ref(), 0);
        gl.uniform_1_f32(self.u_width.as_ref(), uniforms.width);
        gl.uniform_1_f32(self.u_height.as_ref(), uniforms.height);
        gl.uniform_1_f32(self.u_scanline.as_ref(), uniforms.scanline);
    }

    pub(crate) fn unbind(gl: &G) {
        gl.use_program(None);
    }

    pub(crate) fn destroy(self, gl: &G) {
        gl.delete_program(self.program);
    }
}
