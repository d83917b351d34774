use crate::{CrtError, GlContext, ShaderStage};

/// Compile one stage. On failure the shader object is deleted again.
pub(crate) fn compile_shader<G: GlContext + ?Sized>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, CrtError> {
    let shader = gl
        .create_shader(stage.gl_type())
        .map_err(CrtError::ResourceCreation)?;

    gl.shader_source(shader, source);

    gl.compile_shader(shader);

    if gl.get_shader_compile_status(shader) {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        Err(CrtError::ShaderCompile { stage, log })
    }
}

/// Link the given stages into a program.
///
/// The stages are detached afterwards whether or not linking succeeded;
/// deleting them is up to the caller. A program that fails to link is deleted.
pub(crate) fn link_program<G: GlContext + ?Sized>(
    gl: &G,
    shaders: &[G::Shader],
) -> Result<G::Program, CrtError> {
    let program = gl.create_program().map_err(CrtError::ResourceCreation)?;

    for shader in shaders {
        gl.attach_shader(program, *shader);
    }

    gl.link_program(program);

    let linked = gl.get_program_link_status(program);
    let result = if linked {
        Ok(program)
    } else {
        Err(CrtError::ProgramLink(gl.get_program_info_log(program)))
    };

    for shader in shaders {
        gl.detach_shader(program, *shader);
    }
    if !linked {
        gl.delete_program(program);
    }
    result
}

/// Don't keep polling a context that is gone; `GL_CONTEXT_LOST` can repeat forever.
const MAX_DRAINED_ERRORS: usize = 16;

/// Pop every pending GL error and log it. Returns how many there were.
///
/// GL errors after setup are advisory only, so they are never propagated.
pub(crate) fn drain_gl_errors<G: GlContext + ?Sized>(gl: &G, context: &str) -> usize {
    let mut count = 0;
    while count < MAX_DRAINED_ERRORS {
        let error_code = gl.get_error();
        if error_code == glow::NO_ERROR {
            break;
        }
        log::error!(
            "GL error ({context}): {} (0x{error_code:X})",
            gl_error_name(error_code)
        );
        count += 1;
    }
    count
}

pub(crate) fn gl_error_name(error_code: u32) -> &'static str {
    match error_code {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
        _ => "<unknown>",
    }
}
