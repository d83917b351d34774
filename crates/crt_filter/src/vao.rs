use crate::{GlContext, check_for_gl_error};

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct BufferInfo {
    pub location: u32, //
    pub vector_size: i32,
    pub data_type: u32, //GL_FLOAT,GL_UNSIGNED_BYTE
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

// ----------------------------------------------------------------------------

/// Wrapper around either Emulated VAO or GL's VAO.
pub(crate) struct VertexArrayObject<G: GlContext> {
    // If `None`, we emulate VAO:s.
    vao: Option<G::VertexArray>,
    vbo: G::Buffer,
    buffer_infos: Vec<BufferInfo>,
}

impl<G: GlContext> VertexArrayObject<G> {
    pub(crate) fn new(
        gl: &G,
        vbo: G::Buffer,
        buffer_infos: Vec<BufferInfo>,
    ) -> Result<Self, String> {
        let vao = if supports_vao(gl) {
            let vao = gl.create_vertex_array()?;
            check_for_gl_error!(gl, "create_vertex_array");

            // Store state in the VAO:
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));

            for attribute in &buffer_infos {
                set_attribute(gl, attribute);
            }

            gl.bind_vertex_array(None);

            Some(vao)
        } else {
            log::debug!("VAO not supported");
            None
        };

        Ok(Self {
            vao,
            vbo,
            buffer_infos,
        })
    }

    pub(crate) fn bind(&self, gl: &G) {
        if let Some(vao) = self.vao {
            gl.bind_vertex_array(Some(vao));
            check_for_gl_error!(gl, "bind_vertex_array");
        } else {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            check_for_gl_error!(gl, "bind_buffer");

            for attribute in &self.buffer_infos {
                set_attribute(gl, attribute);
            }
        }
    }

    pub(crate) fn unbind(&self, gl: &G) {
        if self.vao.is_some() {
            gl.bind_vertex_array(None);
        } else {
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            for attribute in &self.buffer_infos {
                gl.disable_vertex_attrib_array(attribute.location);
            }
        }
    }

    /// Deletes the VAO, if any. The buffer belongs to whoever created it.
    pub(crate) fn destroy(self, gl: &G) {
        if let Some(vao) = self.vao {
            gl.delete_vertex_array(vao);
        }
    }
}

fn set_attribute<G: GlContext>(gl: &G, attribute: &BufferInfo) {
    gl.vertex_attrib_pointer_f32(
        attribute.location,
        attribute.vector_size,
        attribute.data_type,
        attribute.normalized,
        attribute.stride,
        attribute.offset,
    );
    check_for_gl_error!(gl, "vertex_attrib_pointer_f32");
    gl.enable_vertex_attrib_array(attribute.location);
    check_for_gl_error!(gl, "enable_vertex_attrib_array");
}

// ----------------------------------------------------------------------------

fn supports_vao(gl: &impl GlContext) -> bool {
    const WEBGL_PREFIX: &str = "WebGL ";
    const OPENGL_ES_PREFIX: &str = "OpenGL ES ";

    let version_string = gl.version_string();
    log::debug!("GL version: {version_string:?}.");

    // Examples:
    // * "WebGL 2.0 (OpenGL ES 3.0 Chromium)"
    // * "OpenGL ES 3.2 V@415.0 (GIT@663be55, I724753c5e3)"
    // * "4.6.0 NVIDIA 535.54.03"

    let needs_extension = if let Some(pos) = version_string.rfind(WEBGL_PREFIX) {
        version_string[pos + WEBGL_PREFIX.len()..].contains("1.0")
    } else if version_string.contains(OPENGL_ES_PREFIX) {
        // glow targets es2.0+ so we don't concern about OpenGL ES-CM,OpenGL ES-CL
        version_string.contains("2.0")
    } else {
        // from OpenGL 3 vao into core
        version_string.starts_with('2')
    };

    if !needs_extension {
        return true;
    }

    [
        "OES_vertex_array_object",
        "GL_OES_vertex_array_object",
        "ARB_vertex_array_object",
        "GL_ARB_vertex_array_object",
    ]
    .iter()
    .any(|extension| gl.has_extension(extension))
}
